//! The typed parse tree.
//!
//! The reader lowers raw [`crate::ast::Ast`] forms into these types, and the
//! resolver then fills in scope information. The engine consumes the result;
//! it never looks at source text.
//!
//! The flow is: Source → Parser → AST → Reader → [`Program`] → Resolver →
//! [`ResolvedProgram`] → Engine

use std::fmt;
use std::sync::Arc;

use quire_foundation::{DiceExpr, Facing, Value};

use crate::span::Span;

// =============================================================================
// Program
// =============================================================================

/// A whole gamebook as read from source, before scope resolution.
#[derive(Clone, Debug, Default)]
pub struct Program {
    /// The metadata header.
    pub metadata: Metadata,
    /// Rooms and top-level macros, in source order.
    pub decls: Vec<Decl>,
}

/// A top-level declaration.
#[derive(Clone, Debug)]
pub enum Decl {
    /// `(room "Name" ...)`
    Room(RoomDef),
    /// `(macro name ...)` at top level
    Macro(MacroDef),
}

/// A program after macro expansion and scope resolution.
#[derive(Clone, Debug, Default)]
pub struct ResolvedProgram {
    /// The metadata header.
    pub metadata: Metadata,
    /// Rooms in source order; the first is the entry room.
    pub rooms: Vec<RoomDef>,
}

/// Metadata header entries from `(meta Tag "value")` forms.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    /// `Title`
    pub title: Option<String>,
    /// `Subtitle`
    pub subtitle: Option<String>,
    /// `Author`
    pub author: Option<String>,
    /// `License`
    pub license: Option<String>,
    /// `Note`
    pub note: Option<String>,
    /// `Library` imports, in order. May repeat.
    pub libraries: Vec<String>,
}

/// A room definition.
#[derive(Clone, Debug)]
pub struct RoomDef {
    /// Display name, unique across the program.
    pub name: String,
    /// Statements in source order.
    pub body: Vec<Stmt>,
    /// Source span of the whole form.
    pub span: Span,
}

/// A macro definition. The body is inlined at each `(expand name)`.
#[derive(Clone, Debug)]
pub struct MacroDef {
    /// Macro name.
    pub name: String,
    /// Statements to inline.
    pub body: Vec<Stmt>,
    /// Source span of the definition.
    pub span: Span,
}

// =============================================================================
// Identifiers
// =============================================================================

/// Where a variable lives at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeKind {
    /// Persists for a whole traversal.
    World,
    /// Persists per room across every visit within a traversal.
    Room,
    /// Lives for one handler invocation.
    Local,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World => write!(f, "world"),
            Self::Room => write!(f, "room"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// The scope named by a `(scope ...)` declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclScope {
    /// `(scope world ...)`
    World,
    /// `(scope room ...)`
    Room,
}

/// An identifier occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    /// The bare name, without any `world.`/`room.` prefix.
    pub name: Arc<str>,
    /// Resolved scope. Unqualified identifiers read as [`ScopeKind::Local`]
    /// until the resolver classifies them.
    pub scope: ScopeKind,
    /// Whether the source spelled the scope out (`world.gold`).
    pub qualified: bool,
}

impl Ident {
    /// Creates an unqualified identifier.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            scope: ScopeKind::Local,
            qualified: false,
        }
    }

    /// Creates an identifier with an explicit scope qualifier.
    #[must_use]
    pub fn qualified(name: impl Into<Arc<str>>, scope: ScopeKind) -> Self {
        Self {
            name: name.into(),
            scope,
            qualified: true,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            ScopeKind::Local => write!(f, "{}", self.name),
            scope => write!(f, "{scope}.{}", self.name),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Text with `{name}` interpolations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    /// Literal and variable parts, in order.
    pub parts: Vec<TemplatePart>,
}

/// One piece of a [`Template`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplatePart {
    /// Literal text.
    Lit(String),
    /// An interpolated variable.
    Var(Ident),
}

impl Template {
    /// Creates a template of plain text.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            parts: vec![TemplatePart::Lit(text.into())],
        }
    }

    /// Returns the text if the template has no interpolations.
    #[must_use]
    pub fn as_literal(&self) -> Option<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Lit(s) => out.push_str(s),
                TemplatePart::Var(_) => return None,
            }
        }
        Some(out)
    }

    /// Mutable access to every interpolated identifier.
    pub fn idents_mut(&mut self) -> impl Iterator<Item = &mut Ident> {
        self.parts.iter_mut().filter_map(|part| match part {
            TemplatePart::Var(ident) => Some(ident),
            TemplatePart::Lit(_) => None,
        })
    }
}

// =============================================================================
// Statements
// =============================================================================

/// A statement with its source span.
#[derive(Clone, Debug)]
pub struct Stmt {
    /// What the statement does.
    pub kind: StmtKind,
    /// Where it came from.
    pub span: Span,
}

impl Stmt {
    /// Creates a statement.
    #[must_use]
    pub const fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// A nested statement list.
///
/// `scoped` lists the locals first introduced inside the block; they are
/// dropped when the block exits so sibling statements never see them.
#[derive(Clone, Debug, Default)]
pub struct Block {
    /// Statements in order.
    pub stmts: Vec<Stmt>,
    /// Locals to drop on exit. Filled by the resolver.
    pub scoped: Vec<Arc<str>>,
}

impl Block {
    /// Creates a block with no scoped locals.
    #[must_use]
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self {
            stmts,
            scoped: Vec::new(),
        }
    }
}

/// An `(option "label" ...)` definition.
#[derive(Clone, Debug)]
pub struct OptionDef {
    /// Link label.
    pub label: Template,
    /// Body run when the option is chosen.
    pub body: Block,
    /// Locals live at the definition site, captured by value. Filled by the
    /// resolver.
    pub captures: Vec<Arc<str>>,
}

/// A reference to a room by name, resolved to an id by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomRef {
    /// The target room's name.
    pub name: String,
    /// Where the reference appears.
    pub span: Span,
}

/// Statement variants.
#[derive(Clone, Debug)]
pub enum StmtKind {
    /// A bare string: one text segment.
    Text(Template),
    /// `(say expr)` or a bare call form.
    Expr(Expr),
    /// `(set target value)`
    Assign {
        /// Variable being assigned.
        target: Ident,
        /// New value.
        value: Expr,
    },
    /// `(if cond then [else])`
    If {
        /// Condition.
        cond: Expr,
        /// Taken when the condition is truthy.
        then: Block,
        /// Taken otherwise.
        otherwise: Option<Block>,
    },
    /// `(do stmt...)`
    Block(Block),
    /// `(while cond stmt...)`
    While {
        /// Loop condition, checked before each pass.
        cond: Expr,
        /// Loop body.
        body: Block,
    },
    /// `(do-while cond stmt...)`
    DoWhile {
        /// Loop condition, checked after each pass.
        cond: Expr,
        /// Loop body.
        body: Block,
    },
    /// `(for init cond step stmt...)`
    For {
        /// Runs once before the loop.
        init: Box<Stmt>,
        /// Checked before each pass.
        cond: Expr,
        /// Runs after each pass.
        step: Box<Stmt>,
        /// Loop body.
        body: Block,
    },
    /// `(for-each name coll stmt...)`
    ForEach {
        /// Loop variable.
        var: Ident,
        /// Collection to iterate.
        collection: Expr,
        /// Loop body.
        body: Block,
    },
    /// `(repeat n stmt...)`
    Repeat {
        /// Number of passes.
        count: Expr,
        /// Loop body.
        body: Block,
    },
    /// `(once stmt...)`
    Once(Block),
    /// `(scope world|room name...)`
    Scope {
        /// Which scope the names join.
        scope: DeclScope,
        /// Declared names.
        names: Vec<Arc<str>>,
    },
    /// `(option "label" stmt...)`
    Option(OptionDef),
    /// `(direction "label" ["Room"] [:facing])`
    Direction {
        /// Link label.
        label: Template,
        /// Destination room.
        target: RoomRef,
        /// Facing to adopt on arrival.
        facing: Option<Facing>,
    },
    /// `(goto "Room" [:facing])`
    Goto {
        /// Destination room.
        target: RoomRef,
        /// Facing to adopt on arrival.
        facing: Option<Facing>,
    },
    /// `(macro name stmt...)` inside a room
    MacroDef(MacroDef),
    /// `(expand name)`
    Expand(String),
    /// `(clear-options)`
    ClearOptions,
    /// `(start-over ["label"])`
    StartOver(Template),
    /// `(comment "...")`
    Comment(String),
}

// =============================================================================
// Expressions
// =============================================================================

/// An expression with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    /// What the expression computes.
    pub kind: ExprKind,
    /// Where it came from.
    pub span: Span,
}

impl Expr {
    /// Creates an expression.
    #[must_use]
    pub const fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `and` (short-circuits)
    And,
    /// `or` (short-circuits)
    Or,
}

impl BinaryOp {
    /// Looks up an operator by its source symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "=" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "and" => Self::And,
            "or" => Self::Or,
            _ => return None,
        })
    }

    /// Returns true for comparison operators, which do not fold left.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Gt | Self::Le | Self::Ge
        )
    }

    /// The operator's source symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `(- x)`
    Neg,
    /// `(not x)`
    Not,
}

/// Expression variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// A literal value.
    Literal(Value),
    /// A variable read.
    Var(Ident),
    /// A dice literal, rolled on each evaluation.
    Dice(DiceExpr),
    /// `[a b c]`
    List(Vec<Expr>),
    /// Unary operator application.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// Its operand.
        operand: Box<Expr>,
    },
    /// Binary operator application.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `(if cond then else)` in expression position.
    If {
        /// Condition.
        cond: Box<Expr>,
        /// Value when truthy.
        then: Box<Expr>,
        /// Value otherwise.
        otherwise: Box<Expr>,
    },
    /// `(name args...)` call into the rule library.
    Call {
        /// Function name.
        name: String,
        /// Arguments in order.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Mutable access to every identifier read by this expression.
    pub fn visit_idents_mut(&mut self, f: &mut dyn FnMut(&mut Ident)) {
        match &mut self.kind {
            ExprKind::Var(ident) => f(ident),
            ExprKind::Literal(_) | ExprKind::Dice(_) => {}
            ExprKind::List(items) | ExprKind::Call { args: items, .. } => {
                for item in items {
                    item.visit_idents_mut(f);
                }
            }
            ExprKind::Unary { operand, .. } => operand.visit_idents_mut(f),
            ExprKind::Binary { left, right, .. } => {
                left.visit_idents_mut(f);
                right.visit_idents_mut(f);
            }
            ExprKind::If {
                cond,
                then,
                otherwise,
            } => {
                cond.visit_idents_mut(f);
                then.visit_idents_mut(f);
                otherwise.visit_idents_mut(f);
            }
        }
    }
}
