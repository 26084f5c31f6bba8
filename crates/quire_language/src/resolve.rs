//! Macro expansion and scope resolution.
//!
//! A single forward pass over the program: top-level macros are registered
//! as they appear, `(expand name)` statements are replaced by the macro body,
//! and every identifier is classified by the [`ScopeResolver`]. Blocks
//! record the locals they introduce and options record the locals they
//! capture.

use quire_foundation::{Error, ErrorKind, Result, SemanticLimit};

use crate::macros::MacroTable;
use crate::parser::MAX_NESTING;
use crate::scope::ScopeResolver;
use crate::syntax::{
    Block, Decl, Expr, Ident, OptionDef, Program, ResolvedProgram, RoomDef, Stmt, StmtKind,
    Template,
};

/// Expands macros and classifies identifiers.
///
/// # Errors
/// Returns a compile error for duplicate or undefined macros, or
/// [`ErrorKind::EmptyProgram`] if there are no rooms.
pub fn resolve(program: Program) -> Result<ResolvedProgram> {
    let mut resolution = Resolution::default();
    let mut rooms = Vec::new();

    for decl in program.decls {
        match decl {
            Decl::Macro(def) => resolution.macros.define(def)?,
            Decl::Room(room) => {
                let name = room.name.clone();
                let room = resolution
                    .room(room)
                    .map_err(|e| e.in_frame(format!("room {name}")))?;
                rooms.push(room);
            }
        }
    }

    if rooms.is_empty() {
        return Err(Error::new(ErrorKind::EmptyProgram));
    }

    tracing::debug!(
        rooms = rooms.len(),
        macros = resolution.macros.len(),
        "resolved program"
    );
    Ok(ResolvedProgram {
        metadata: program.metadata,
        rooms,
    })
}

#[derive(Default)]
struct Resolution {
    scopes: ScopeResolver,
    macros: MacroTable,
    /// Blocks and macro expansions enclosing the current statement.
    depth: usize,
}

impl Resolution {
    fn room(&mut self, room: RoomDef) -> Result<RoomDef> {
        self.scopes.begin_room();
        Ok(RoomDef {
            body: self.stmts(room.body)?,
            ..room
        })
    }

    fn stmts(&mut self, stmts: Vec<Stmt>) -> Result<Vec<Stmt>> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            self.stmt(stmt, &mut out)?;
        }
        Ok(out)
    }

    /// Runs `f` one level deeper. Macros can nest blocks past what the
    /// parser allows, so the depth is checked again here.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(Error::limit_exceeded(SemanticLimit::Nesting {
                limit: MAX_NESTING,
            }));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn block(&mut self, block: Block) -> Result<Block> {
        self.nested(|this| {
            let mark = this.scopes.enter_block();
            let stmts = this.stmts(block.stmts)?;
            let scoped = this.scopes.exit_block(mark);
            Ok(Block { stmts, scoped })
        })
    }

    fn stmt(&mut self, stmt: Stmt, out: &mut Vec<Stmt>) -> Result<()> {
        let Stmt { kind, span } = stmt;
        let kind = match kind {
            StmtKind::Text(mut template) => {
                self.template(&mut template);
                StmtKind::Text(template)
            }
            StmtKind::Expr(mut expr) => {
                self.expr(&mut expr);
                StmtKind::Expr(expr)
            }
            StmtKind::Assign {
                mut target,
                mut value,
            } => {
                self.expr(&mut value);
                self.ident(&mut target);
                StmtKind::Assign { target, value }
            }
            StmtKind::If {
                mut cond,
                then,
                otherwise,
            } => {
                self.expr(&mut cond);
                StmtKind::If {
                    cond,
                    then: self.block(then)?,
                    otherwise: otherwise.map(|b| self.block(b)).transpose()?,
                }
            }
            StmtKind::Block(block) => StmtKind::Block(self.block(block)?),
            StmtKind::While { mut cond, body } => {
                self.expr(&mut cond);
                StmtKind::While {
                    cond,
                    body: self.block(body)?,
                }
            }
            StmtKind::DoWhile { mut cond, body } => {
                // The condition sees locals introduced by the body.
                self.nested(|this| {
                    let mark = this.scopes.enter_block();
                    let stmts = this.stmts(body.stmts)?;
                    this.expr(&mut cond);
                    let scoped = this.scopes.exit_block(mark);
                    Ok(StmtKind::DoWhile {
                        cond,
                        body: Block { stmts, scoped },
                    })
                })?
            }
            StmtKind::For {
                init,
                mut cond,
                step,
                body,
            } => self.nested(|this| {
                let mark = this.scopes.enter_block();
                let init = this.single(*init)?;
                this.expr(&mut cond);
                let stmts = this.stmts(body.stmts)?;
                let step = this.single(*step)?;
                let scoped = this.scopes.exit_block(mark);
                Ok(StmtKind::For {
                    init: Box::new(init),
                    cond,
                    step: Box::new(step),
                    body: Block { stmts, scoped },
                })
            })?,
            StmtKind::ForEach {
                mut var,
                mut collection,
                body,
            } => {
                self.expr(&mut collection);
                self.nested(|this| {
                    let mark = this.scopes.enter_block();
                    this.ident(&mut var);
                    let stmts = this.stmts(body.stmts)?;
                    let scoped = this.scopes.exit_block(mark);
                    Ok(StmtKind::ForEach {
                        var,
                        collection,
                        body: Block { stmts, scoped },
                    })
                })?
            }
            StmtKind::Repeat { mut count, body } => {
                self.expr(&mut count);
                StmtKind::Repeat {
                    count,
                    body: self.block(body)?,
                }
            }
            StmtKind::Once(body) => StmtKind::Once(self.block(body)?),
            StmtKind::Scope { scope, names } => {
                for name in &names {
                    self.scopes.declare(scope, name);
                }
                StmtKind::Scope { scope, names }
            }
            StmtKind::Option(OptionDef {
                mut label, body, ..
            }) => {
                self.template(&mut label);
                let captures = self.scopes.live_locals();
                StmtKind::Option(OptionDef {
                    label,
                    body: self.block(body)?,
                    captures,
                })
            }
            StmtKind::Direction {
                mut label,
                target,
                facing,
            } => {
                self.template(&mut label);
                StmtKind::Direction {
                    label,
                    target,
                    facing,
                }
            }
            StmtKind::StartOver(mut label) => {
                self.template(&mut label);
                StmtKind::StartOver(label)
            }
            StmtKind::MacroDef(def) => {
                self.macros.define(def)?;
                return Ok(());
            }
            StmtKind::Expand(name) => {
                let body = self.macros.begin_expansion(&name)?;
                let expanded = self.nested(|this| this.stmts(body));
                self.macros.end_expansion();
                out.extend(expanded.map_err(|e| e.in_frame(format!("macro {name}")))?);
                return Ok(());
            }
            kind @ (StmtKind::Goto { .. }
            | StmtKind::ClearOptions
            | StmtKind::Comment(_)) => kind,
        };
        out.push(Stmt::new(kind, span));
        Ok(())
    }

    /// Resolves a statement that must stay a single statement, such as the
    /// init and step of a `for`.
    fn single(&mut self, stmt: Stmt) -> Result<Stmt> {
        let span = stmt.span;
        let mut out = self.stmts(vec![stmt])?;
        if out.len() == 1 {
            Ok(out.remove(0))
        } else {
            Ok(Stmt::new(StmtKind::Block(Block::new(out)), span))
        }
    }

    fn ident(&mut self, ident: &mut Ident) {
        resolve_ident(&mut self.scopes, ident);
    }

    fn expr(&mut self, expr: &mut Expr) {
        let scopes = &mut self.scopes;
        expr.visit_idents_mut(&mut |ident| resolve_ident(scopes, ident));
    }

    fn template(&mut self, template: &mut Template) {
        for ident in template.idents_mut() {
            resolve_ident(&mut self.scopes, ident);
        }
    }
}

fn resolve_ident(scopes: &mut ScopeResolver, ident: &mut Ident) {
    if !ident.qualified {
        ident.scope = scopes.resolve(&ident.name);
    }
}
