//! Abstract Syntax Tree for gamebook source.
//!
//! The AST is the untyped S-expression layer. [`crate::reader`] turns it
//! into the typed program in [`crate::syntax`].

use crate::span::Span;

/// An AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Ast {
    /// `nil`
    Nil(Span),
    /// `true` or `false`
    Bool(bool, Span),
    /// Integer literal like `42`
    Int(i64, Span),
    /// Float literal like `2.5`
    Float(f64, Span),
    /// String literal like `"hello"`
    String(String, Span),
    /// Symbol like `gold` or `world.gold`
    Symbol(String, Span),
    /// Keyword like `:n`
    Keyword(String, Span),
    /// Dice literal like `2d6+1`
    Dice(String, Span),

    /// List form like `(+ 1 2)`
    List(Vec<Ast>, Span),
    /// Vector form like `[1 2 3]`
    Vector(Vec<Ast>, Span),
}

impl Ast {
    /// Returns the source span of this AST node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Nil(s)
            | Self::Bool(_, s)
            | Self::Int(_, s)
            | Self::Float(_, s)
            | Self::String(_, s)
            | Self::Symbol(_, s)
            | Self::Keyword(_, s)
            | Self::Dice(_, s)
            | Self::List(_, s)
            | Self::Vector(_, s) => *s,
        }
    }

    /// Returns true if this is a string literal.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_, _))
    }

    /// Returns true if this is a list.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_, _))
    }

    /// Returns the elements of a list, or None if not a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Ast]> {
        match self {
            Self::List(elements, _) => Some(elements),
            _ => None,
        }
    }

    /// Returns the symbol name, or None if not a symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(name, _) => Some(name),
            _ => None,
        }
    }

    /// Returns the keyword name, or None if not a keyword.
    #[must_use]
    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Self::Keyword(name, _) => Some(name),
            _ => None,
        }
    }

    /// Returns the string value, or None if not a string.
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s, _) => Some(s),
            _ => None,
        }
    }

    /// Returns the head symbol of a list form like `(room ...)`.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol()
    }

    /// A human-readable type name for this AST node.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Nil(_) => "nil",
            Self::Bool(_, _) => "bool",
            Self::Int(_, _) => "int",
            Self::Float(_, _) => "float",
            Self::String(_, _) => "string",
            Self::Symbol(_, _) => "symbol",
            Self::Keyword(_, _) => "keyword",
            Self::Dice(_, _) => "dice",
            Self::List(_, _) => "list",
            Self::Vector(_, _) => "vector",
        }
    }
}

/// Helper constructors for AST nodes (for testing).
#[cfg(test)]
impl Ast {
    /// Integer literal with an empty span.
    pub fn int(n: i64) -> Self {
        Self::Int(n, Span::default())
    }

    /// String literal with an empty span.
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into(), Span::default())
    }

    /// Symbol with an empty span.
    pub fn symbol(s: impl Into<String>) -> Self {
        Self::Symbol(s.into(), Span::default())
    }

    /// Keyword with an empty span.
    pub fn keyword(s: impl Into<String>) -> Self {
        Self::Keyword(s.into(), Span::default())
    }

    /// List form with an empty span.
    pub fn list(elements: Vec<Ast>) -> Self {
        Self::List(elements, Span::default())
    }
}
