//! Parser for gamebook source.
//!
//! The parser converts a stream of tokens into S-expression [`Ast`] nodes.
//! It knows nothing about rooms or statements; that is the reader's job.

use quire_foundation::{Error, ErrorKind, Result};

use crate::ast::Ast;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Deepest list or vector nesting the parser accepts. Every later stage
/// walks forms recursively, so this bounds their stack use too.
pub const MAX_NESTING: usize = 32;

/// Parser for gamebook source code.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Source text (for error messages).
    source: &'src str,
    /// Open delimiters enclosing the current token.
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            source,
            depth: 0,
        }
    }

    /// Parses a single form from the source.
    ///
    /// # Errors
    /// Returns an error if the source cannot be parsed.
    pub fn parse(&mut self) -> Result<Ast> {
        self.skip_trivia();
        self.parse_form()
    }

    /// Parses all forms from the source.
    ///
    /// # Errors
    /// Returns an error if the source cannot be parsed.
    pub fn parse_all(&mut self) -> Result<Vec<Ast>> {
        let mut forms = Vec::new();
        self.skip_trivia();

        while self.current.kind != TokenKind::Eof {
            forms.push(self.parse_form()?);
            self.skip_trivia();
        }

        Ok(forms)
    }

    /// Parses one form.
    fn parse_form(&mut self) -> Result<Ast> {
        self.skip_trivia();

        let span = self.current.span;
        let atom = match &self.current.kind {
            TokenKind::Nil => Ast::Nil(span),
            TokenKind::True => Ast::Bool(true, span),
            TokenKind::False => Ast::Bool(false, span),
            TokenKind::Int(n) => Ast::Int(*n, span),
            TokenKind::Float(n) => Ast::Float(*n, span),
            TokenKind::String(s) => Ast::String(s.clone(), span),
            TokenKind::Symbol(name) => Ast::Symbol(name.clone(), span),
            TokenKind::Keyword(name) => Ast::Keyword(name.clone(), span),
            TokenKind::Dice(notation) => Ast::Dice(notation.clone(), span),
            TokenKind::LParen => return self.parse_seq(TokenKind::LParen, TokenKind::RParen),
            TokenKind::LBracket => {
                return self.parse_seq(TokenKind::LBracket, TokenKind::RBracket);
            }
            TokenKind::Eof => return Err(self.error("unexpected end of input")),
            TokenKind::Error(msg) => return Err(self.error(msg)),
            TokenKind::RParen | TokenKind::RBracket => {
                return Err(self.error(&format!("unexpected {}", self.current.kind.name())));
            }
            TokenKind::Comment(_) => {
                self.advance();
                return self.parse_form();
            }
        };
        self.advance();
        Ok(atom)
    }

    /// Parses a delimited sequence: `(...)` or `[...]`.
    fn parse_seq(&mut self, open: TokenKind, close: TokenKind) -> Result<Ast> {
        let start_span = self.current.span;
        if self.depth >= MAX_NESTING {
            return Err(self.error_at(
                start_span,
                &format!("forms nested more than {MAX_NESTING} deep"),
            ));
        }
        self.expect(&open)?;
        self.depth += 1;

        let mut elements = Vec::new();
        self.skip_trivia();

        while self.current.kind != close {
            if self.current.kind == TokenKind::Eof {
                let what = if open == TokenKind::LParen {
                    "unterminated list"
                } else {
                    "unterminated vector"
                };
                return Err(self.error_at(start_span, what));
            }
            elements.push(self.parse_form()?);
            self.skip_trivia();
        }

        let end_span = self.current.span;
        self.expect(&close)?;
        self.depth -= 1;

        let span = start_span.to(end_span);
        Ok(if open == TokenKind::LParen {
            Ast::List(elements, span)
        } else {
            Ast::Vector(elements, span)
        })
    }

    /// Skips comment tokens.
    fn skip_trivia(&mut self) {
        while self.current.kind.is_trivia() {
            self.advance();
        }
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// Expects the current token to be of a specific kind, then advances.
    fn expect(&mut self, expected: &TokenKind) -> Result<()> {
        let matches =
            std::mem::discriminant(&self.current.kind) == std::mem::discriminant(expected);

        if matches {
            self.advance();
            Ok(())
        } else {
            let expected_name = expected.name();
            Err(self.error(&format!(
                "expected {expected_name}, found {}",
                self.current.kind.name()
            )))
        }
    }

    /// Creates a parse error at the current position.
    fn error(&self, message: &str) -> Error {
        self.error_at(self.current.span, message)
    }

    /// Creates a parse error at a specific span.
    fn error_at(&self, span: Span, message: &str) -> Error {
        parse_error(self.source, span, message)
    }
}

/// Builds a positioned parse error carrying the offending source line.
#[must_use]
pub fn parse_error(source: &str, span: Span, message: &str) -> Error {
    Error::new(ErrorKind::ParseError {
        message: message.to_string(),
        line: span.line,
        column: span.column,
        context: span.line_text(source).to_string(),
    })
}

/// Parses source code into AST.
///
/// # Errors
/// Returns an error if the source cannot be parsed.
pub fn parse(source: &str) -> Result<Vec<Ast>> {
    Parser::new(source).parse_all()
}

/// Parses a single form from source.
///
/// # Errors
/// Returns an error if the source cannot be parsed.
pub fn parse_one(source: &str) -> Result<Ast> {
    Parser::new(source).parse()
}
