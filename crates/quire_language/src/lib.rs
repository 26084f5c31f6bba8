//! Lexer, parser, reader and scope resolver for gamebook scripts.
//!
//! This crate provides:
//! - `Lexer` - Tokenization of gamebook source
//! - `Parser` - Parsing tokens into S-expression AST
//! - `Reader` - Lowering AST into the typed parse tree
//! - `resolve` - Macro expansion and World/Room/Local scope classification

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod reader;
pub mod resolve;
pub mod scope;
pub mod span;
pub mod syntax;
pub mod token;


pub use ast::Ast;
pub use lexer::Lexer;
pub use macros::MacroTable;
pub use parser::{MAX_NESTING, Parser, parse, parse_one};
pub use reader::{Reader, read_program};
pub use resolve::resolve;
pub use scope::ScopeResolver;
pub use span::Span;
pub use syntax::{
    BinaryOp, Block, Decl, DeclScope, Expr, ExprKind, Ident, MacroDef, Metadata, OptionDef,
    Program, ResolvedProgram, RoomDef, RoomRef, ScopeKind, Stmt, StmtKind, Template,
    TemplatePart, UnaryOp,
};
pub use token::{Token, TokenKind};

use quire_foundation::Result;

/// Reads and resolves a gamebook script in one step.
///
/// # Errors
/// Returns the first parse or compile error found.
pub fn load(source: &str) -> Result<ResolvedProgram> {
    resolve(read_program(source)?)
}
