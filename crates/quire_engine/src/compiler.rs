//! The closure compiler.
//!
//! Turns a [`ResolvedProgram`] into a [`CompiledProgram`]: one boxed closure
//! per room body, with nested closures for every statement, expression and
//! option. Identifier references are lowered to direct world, room or local
//! accesses using the scope the resolver assigned, room names are resolved to
//! [`RoomId`]s and library calls to [`NativeFn`]s, so nothing is looked up by
//! name while a traversal runs.
//!
//! Once-blocks and options are numbered with program-wide counters in the
//! order they appear.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use quire_foundation::{
    Error, ErrorContext, ErrorKind, Facing, NativeFn, OptionId, Result, RoomId, Type, Value,
};
use quire_language::{
    BinaryOp, Block, Expr, ExprKind, Ident, Metadata, OptionDef, ResolvedProgram, RoomRef,
    ScopeKind, Span, Stmt, StmtKind, Template, TemplatePart,
};
use quire_stdlib::Environment;

use crate::machine::{Flow, Frame, Machine, PendingChoice};
use crate::ops;
use crate::state::{Bindings, room_id};

/// A compiled statement.
pub(crate) type StmtFn = Box<dyn Fn(&mut Machine, &mut Frame) -> Result<Flow> + Send + Sync>;

/// A compiled expression.
pub(crate) type ExprFn = Box<dyn Fn(&mut Machine, &Frame) -> Result<Value> + Send + Sync>;

/// Writes a value to a resolved identifier.
type SetFn = Box<dyn Fn(&mut Machine, &mut Frame, Value) + Send + Sync>;

fn stmt_fn(
    f: impl Fn(&mut Machine, &mut Frame) -> Result<Flow> + Send + Sync + 'static,
) -> StmtFn {
    Box::new(f)
}

fn expr_fn(f: impl Fn(&mut Machine, &Frame) -> Result<Value> + Send + Sync + 'static) -> ExprFn {
    Box::new(f)
}

fn set_fn(f: impl Fn(&mut Machine, &mut Frame, Value) + Send + Sync + 'static) -> SetFn {
    Box::new(f)
}

// =============================================================================
// Compiled Program
// =============================================================================

/// A room handler.
pub struct CompiledRoom {
    /// Arena id.
    pub id: RoomId,
    /// Display name.
    pub name: String,
    pub(crate) body: StmtFn,
}

impl fmt::Debug for CompiledRoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoom")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An option handler.
pub struct CompiledOption {
    /// Program-wide option number.
    pub id: OptionId,
    /// The room the option was declared in.
    pub room: RoomId,
    pub(crate) body: StmtFn,
}

impl fmt::Debug for CompiledOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledOption")
            .field("id", &self.id)
            .field("room", &self.room)
            .finish_non_exhaustive()
    }
}

/// A program ready to run.
#[derive(Debug)]
pub struct CompiledProgram {
    /// Header metadata, carried through for the renderer.
    pub metadata: Metadata,
    rooms: Vec<CompiledRoom>,
    options: u32,
    once_blocks: u32,
}

impl CompiledProgram {
    /// Every room, in arena order.
    #[must_use]
    pub fn rooms(&self) -> &[CompiledRoom] {
        &self.rooms
    }

    /// The room with id `id`.
    ///
    /// # Errors
    /// Returns an internal error for an id outside the arena.
    pub fn room(&self, id: RoomId) -> Result<&CompiledRoom> {
        self.rooms
            .get(id.index())
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no room with id {id}"))))
    }

    /// The room a traversal starts in: the first one declared.
    #[must_use]
    pub const fn entry(&self) -> RoomId {
        RoomId(0)
    }

    /// Number of option handlers.
    #[must_use]
    pub const fn option_count(&self) -> u32 {
        self.options
    }

    /// Number of once-blocks.
    #[must_use]
    pub const fn once_count(&self) -> u32 {
        self.once_blocks
    }
}

/// Compiles `program` against the libraries its metadata imports.
///
/// # Errors
/// Returns the first compile error: unknown library, duplicate room, unknown
/// room, unknown function or arity mismatch.
pub fn compile(program: &ResolvedProgram) -> Result<CompiledProgram> {
    let env = Environment::with_libraries(&program.metadata.libraries)?;
    compile_with(program, &env)
}

/// Compiles `program` against an explicit environment.
///
/// # Errors
/// Same as [`compile`], minus library errors.
pub fn compile_with(program: &ResolvedProgram, env: &Environment) -> Result<CompiledProgram> {
    if program.rooms.is_empty() {
        return Err(Error::new(ErrorKind::EmptyProgram));
    }

    let mut room_ids = HashMap::with_capacity(program.rooms.len());
    for (index, room) in program.rooms.iter().enumerate() {
        if room_ids.insert(room.name.as_str(), room_id(index)).is_some() {
            return Err(locate(Error::duplicate_room(&room.name), room.span));
        }
    }

    let mut compiler = Compiler {
        env,
        room_ids,
        current: RoomId(0),
        current_name: "",
        next_option: 0,
        next_once: 0,
    };

    let mut rooms = Vec::with_capacity(program.rooms.len());
    for (index, room) in program.rooms.iter().enumerate() {
        compiler.current = room_id(index);
        compiler.current_name = &room.name;
        let body = compiler
            .stmts(&room.body)
            .map_err(|e| e.in_frame(format!("room {}", room.name)))?;
        rooms.push(CompiledRoom {
            id: compiler.current,
            name: room.name.clone(),
            body: sequence(body),
        });
    }

    let compiled = CompiledProgram {
        metadata: program.metadata.clone(),
        rooms,
        options: compiler.next_option,
        once_blocks: compiler.next_once,
    };
    tracing::info!(
        rooms = compiled.rooms().len(),
        options = compiled.option_count(),
        once_blocks = compiled.once_count(),
        libraries = ?env.libraries(),
        "compiled program"
    );
    Ok(compiled)
}

/// Attaches a source position to an error that has none.
fn locate(mut err: Error, span: Span) -> Error {
    let context = err.context.get_or_insert_with(ErrorContext::new);
    if context.line.is_none() {
        context.line = Some(span.line as usize);
        context.column = Some(span.column as usize);
    }
    err
}

// =============================================================================
// Compiler
// =============================================================================

struct Compiler<'p> {
    env: &'p Environment,
    room_ids: HashMap<&'p str, RoomId>,
    current: RoomId,
    current_name: &'p str,
    next_option: u32,
    next_once: u32,
}

impl Compiler<'_> {
    fn room_ref(&self, target: &RoomRef) -> Result<RoomId> {
        self.room_ids.get(target.name.as_str()).copied().ok_or_else(|| {
            locate(
                Error::unknown_room(&target.name, self.current_name),
                target.span,
            )
        })
    }

    fn stmts(&mut self, stmts: &[Stmt]) -> Result<Vec<StmtFn>> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            if let Some(f) = self.stmt(stmt)? {
                out.push(f);
            }
        }
        Ok(out)
    }

    fn block(&mut self, block: &Block) -> Result<StmtFn> {
        let stmts = self.stmts(&block.stmts)?;
        Ok(scoped(stmts, block.scoped.clone()))
    }

    #[allow(clippy::too_many_lines)]
    fn stmt(&mut self, stmt: &Stmt) -> Result<Option<StmtFn>> {
        let span = stmt.span;
        let f = match &stmt.kind {
            StmtKind::Text(template) => {
                let template = compile_template(template);
                stmt_fn(move |m, frame| {
                    let text = template.render(m, frame).map_err(|e| locate(e, span))?;
                    frame.say(text);
                    Ok(Flow::Next)
                })
            }
            StmtKind::Expr(expr) => {
                let expr = self.expr(expr)?;
                stmt_fn(move |m, frame| {
                    match expr(m, frame).map_err(|e| locate(e, span))? {
                        Value::Item(item) => m.add_item(frame.room, item),
                        value => {
                            if let Some(text) = value.to_text() {
                                frame.say(text);
                            }
                        }
                    }
                    Ok(Flow::Next)
                })
            }
            StmtKind::Assign { target, value } => {
                let value = self.expr(value)?;
                let set = setter(target);
                stmt_fn(move |m, frame| {
                    let v = value(m, frame).map_err(|e| locate(e, span))?;
                    set(m, frame, v);
                    Ok(Flow::Next)
                })
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.expr(cond)?;
                let then = self.block(then)?;
                let otherwise = otherwise.as_ref().map(|b| self.block(b)).transpose()?;
                stmt_fn(move |m, frame| {
                    if cond(m, frame)?.is_truthy() {
                        then(m, frame)
                    } else if let Some(otherwise) = &otherwise {
                        otherwise(m, frame)
                    } else {
                        Ok(Flow::Next)
                    }
                })
            }
            StmtKind::Block(block) => self.block(block)?,
            StmtKind::While { cond, body } => {
                let cond = self.expr(cond)?;
                let body = self.block(body)?;
                stmt_fn(move |m, frame| {
                    while cond(m, frame)?.is_truthy() {
                        if body(m, frame)? == Flow::Unwind {
                            return Ok(Flow::Unwind);
                        }
                    }
                    Ok(Flow::Next)
                })
            }
            StmtKind::DoWhile { cond, body } => {
                let cond = self.expr(cond)?;
                let stmts = self.stmts(&body.stmts)?;
                let names = body.scoped.clone();
                // The condition reads the body's locals, so they are dropped
                // only after it has been evaluated.
                stmt_fn(move |m, frame| {
                    loop {
                        // `None` ends the loop normally.
                        let outcome = match run_all(&stmts, m, frame) {
                            Ok(Flow::Next) => {
                                cond(m, frame).map(|v| v.is_truthy().then_some(Flow::Next))
                            }
                            other => other.map(Some),
                        };
                        drop_locals(frame, &names);
                        match outcome? {
                            Some(Flow::Next) => {}
                            Some(Flow::Unwind) => return Ok(Flow::Unwind),
                            None => return Ok(Flow::Next),
                        }
                    }
                })
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                let init = self.stmt(init)?;
                let cond = self.expr(cond)?;
                let stmts = self.stmts(&body.stmts)?;
                let step = self.stmt(step)?;
                scoped(
                    vec![stmt_fn(move |m, frame| {
                        if let Some(init) = &init {
                            init(m, frame)?;
                        }
                        while cond(m, frame)?.is_truthy() {
                            if run_all(&stmts, m, frame)? == Flow::Unwind {
                                return Ok(Flow::Unwind);
                            }
                            if let Some(step) = &step {
                                step(m, frame)?;
                            }
                        }
                        Ok(Flow::Next)
                    })],
                    body.scoped.clone(),
                )
            }
            StmtKind::ForEach {
                var,
                collection,
                body,
            } => {
                let collection = self.expr(collection)?;
                let set = setter(var);
                let stmts = self.stmts(&body.stmts)?;
                scoped(
                    vec![stmt_fn(move |m, frame| {
                        let items = match collection(m, frame)? {
                            Value::List(items) => items,
                            other => {
                                return Err(locate(
                                    Error::type_mismatch(Type::List, other.value_type()),
                                    span,
                                ));
                            }
                        };
                        for item in items {
                            set(m, frame, item);
                            if run_all(&stmts, m, frame)? == Flow::Unwind {
                                return Ok(Flow::Unwind);
                            }
                        }
                        Ok(Flow::Next)
                    })],
                    body.scoped.clone(),
                )
            }
            StmtKind::Repeat { count, body } => {
                let count = self.expr(count)?;
                let body = self.block(body)?;
                stmt_fn(move |m, frame| {
                    let n = count(m, frame)?.expect_int().map_err(|e| locate(e, span))?;
                    for _ in 0..n.max(0) {
                        if body(m, frame)? == Flow::Unwind {
                            return Ok(Flow::Unwind);
                        }
                    }
                    Ok(Flow::Next)
                })
            }
            StmtKind::Once(block) => {
                let id = self.next_once;
                self.next_once += 1;
                let body = self.block(block)?;
                stmt_fn(move |m, frame| {
                    if m.mark_once(frame.room, id) {
                        body(m, frame)
                    } else {
                        Ok(Flow::Next)
                    }
                })
            }
            StmtKind::Option(def) => self.option(def)?,
            StmtKind::Direction {
                label,
                target,
                facing,
            } => {
                let label = compile_template(label);
                let target = self.room_ref(target)?;
                let facing = *facing;
                stmt_fn(move |m, frame| {
                    let label = label.render(m, frame)?;
                    frame.push_choice(PendingChoice::Direction {
                        label,
                        target,
                        facing,
                    });
                    Ok(Flow::Next)
                })
            }
            StmtKind::Goto { target, facing } => {
                let target = self.room_ref(target)?;
                let facing: Option<Facing> = *facing;
                stmt_fn(move |m, frame| {
                    let node = m.goto(target, facing)?;
                    frame.set_continuation(node);
                    Ok(Flow::Unwind)
                })
            }
            StmtKind::ClearOptions => stmt_fn(|_, frame| {
                frame.clear_choices();
                Ok(Flow::Next)
            }),
            StmtKind::StartOver(label) => {
                let label = compile_template(label);
                stmt_fn(move |m, frame| {
                    let label = label.render(m, frame)?;
                    frame.push_choice(PendingChoice::StartOver { label });
                    Ok(Flow::Next)
                })
            }
            StmtKind::Expand(name) => {
                return Err(locate(
                    Error::new(ErrorKind::Internal(format!("macro {name} was not expanded"))),
                    span,
                ));
            }
            StmtKind::Scope { .. } | StmtKind::MacroDef(_) | StmtKind::Comment(_) => {
                return Ok(None);
            }
        };
        Ok(Some(f))
    }

    fn option(&mut self, def: &OptionDef) -> Result<StmtFn> {
        let id = OptionId(self.next_option);
        self.next_option += 1;
        let label = compile_template(&def.label);
        let body = self.block(&def.body)?;
        let handler = Arc::new(CompiledOption {
            id,
            room: self.current,
            body,
        });
        let captures = def.captures.clone();
        Ok(stmt_fn(move |m, frame| {
            let label = label.render(m, frame)?;
            let captured: Bindings = captures
                .iter()
                .filter_map(|name| {
                    frame
                        .locals
                        .get(name)
                        .map(|value| (Arc::clone(name), value.clone()))
                })
                .collect();
            frame.push_choice(PendingChoice::Option {
                label,
                handler: Arc::clone(&handler),
                captured,
            });
            Ok(Flow::Next)
        }))
    }

    // --- expressions ---

    fn exprs(&self, exprs: &[Expr]) -> Result<Vec<ExprFn>> {
        exprs.iter().map(|e| self.expr(e)).collect()
    }

    fn expr(&self, expr: &Expr) -> Result<ExprFn> {
        let f = match &expr.kind {
            ExprKind::Literal(value) => {
                let value = value.clone();
                expr_fn(move |_, _| Ok(value.clone()))
            }
            ExprKind::Var(ident) => getter(ident),
            ExprKind::Dice(dice) => {
                let dice = dice.clone();
                expr_fn(move |m, frame| Ok(Value::Int(m.roll(frame.room, &dice)?)))
            }
            ExprKind::List(items) => {
                let items = self.exprs(items)?;
                expr_fn(move |m, frame| {
                    let values = items
                        .iter()
                        .map(|item| item(m, frame))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(ops::list(values))
                })
            }
            ExprKind::Unary { op, operand } => {
                let op = *op;
                let operand = self.expr(operand)?;
                expr_fn(move |m, frame| ops::unary(op, operand(m, frame)?))
            }
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let (left, right) = (self.expr(left)?, self.expr(right)?);
                expr_fn(move |m, frame| {
                    let a = left(m, frame)?;
                    if a.is_truthy() { right(m, frame) } else { Ok(a) }
                })
            }
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let (left, right) = (self.expr(left)?, self.expr(right)?);
                expr_fn(move |m, frame| {
                    let a = left(m, frame)?;
                    if a.is_truthy() { Ok(a) } else { right(m, frame) }
                })
            }
            ExprKind::Binary { op, left, right } => {
                let op = *op;
                let (left, right) = (self.expr(left)?, self.expr(right)?);
                expr_fn(move |m, frame| {
                    let a = left(m, frame)?;
                    let b = right(m, frame)?;
                    ops::binary(op, a, b)
                })
            }
            ExprKind::If {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.expr(cond)?;
                let then = self.expr(then)?;
                let otherwise = self.expr(otherwise)?;
                expr_fn(move |m, frame| {
                    if cond(m, frame)?.is_truthy() {
                        then(m, frame)
                    } else {
                        otherwise(m, frame)
                    }
                })
            }
            ExprKind::Call { name, args } => self.call(name, args, expr.span)?,
        };
        Ok(f)
    }

    fn call(&self, name: &str, args: &[Expr], span: Span) -> Result<ExprFn> {
        let function: NativeFn = self.env.resolve(name).map_err(|e| locate(e, span))?;
        if !function.arity.accepts(args.len()) {
            return Err(locate(
                Error::arity_mismatch(name, function.arity.to_string(), args.len()),
                span,
            ));
        }
        let args = self.exprs(args)?;
        Ok(expr_fn(move |m, frame| {
            let values = args
                .iter()
                .map(|arg| arg(m, frame))
                .collect::<Result<Vec<_>>>()?;
            m.call_native(function, frame.room, &values)
        }))
    }
}

fn compile_template(template: &Template) -> CompiledTemplate {
    let pieces = template
        .parts
        .iter()
        .map(|part| match part {
            TemplatePart::Lit(text) => Piece::Lit(text.clone()),
            TemplatePart::Var(ident) => Piece::Var(getter(ident)),
        })
        .collect();
    CompiledTemplate(pieces)
}

fn getter(ident: &Ident) -> ExprFn {
    let name = Arc::clone(&ident.name);
    match ident.scope {
        ScopeKind::World => expr_fn(move |m, _| m.world(&name)),
        ScopeKind::Room => expr_fn(move |m, frame| m.room_var(frame.room, &name)),
        ScopeKind::Local => expr_fn(move |_, frame| {
            frame
                .locals
                .get(&name)
                .cloned()
                .ok_or_else(|| Error::unbound_variable(name.to_string()))
        }),
    }
}

fn setter(ident: &Ident) -> SetFn {
    let name = Arc::clone(&ident.name);
    match ident.scope {
        ScopeKind::World => set_fn(move |m, _, value| m.set_world(Arc::clone(&name), value)),
        ScopeKind::Room => set_fn(move |m, frame, value| {
            m.set_room_var(frame.room, Arc::clone(&name), value);
        }),
        ScopeKind::Local => set_fn(move |_, frame, value| {
            frame.locals.insert(Arc::clone(&name), value);
        }),
    }
}

// =============================================================================
// Sequencing
// =============================================================================

fn run_all(stmts: &[StmtFn], m: &mut Machine, frame: &mut Frame) -> Result<Flow> {
    for stmt in stmts {
        if stmt(m, frame)? == Flow::Unwind {
            return Ok(Flow::Unwind);
        }
    }
    Ok(Flow::Next)
}

fn drop_locals(frame: &mut Frame, names: &[Arc<str>]) {
    for name in names {
        frame.locals.remove(name);
    }
}

fn sequence(stmts: Vec<StmtFn>) -> StmtFn {
    stmt_fn(move |m, frame| run_all(&stmts, m, frame))
}

/// Runs `stmts`, then forgets the locals they introduced, whatever the
/// outcome.
fn scoped(stmts: Vec<StmtFn>, names: Vec<Arc<str>>) -> StmtFn {
    if names.is_empty() {
        return sequence(stmts);
    }
    stmt_fn(move |m, frame| {
        let flow = run_all(&stmts, m, frame);
        drop_locals(frame, &names);
        flow
    })
}

// =============================================================================
// Templates
// =============================================================================

enum Piece {
    Lit(String),
    Var(ExprFn),
}

/// A text template with its interpolations compiled to getters.
struct CompiledTemplate(Vec<Piece>);

impl CompiledTemplate {
    fn render(&self, m: &mut Machine, frame: &Frame) -> Result<String> {
        let mut out = String::new();
        for piece in &self.0 {
            match piece {
                Piece::Lit(text) => out.push_str(text),
                Piece::Var(get) => {
                    if let Some(text) = get(m, frame)?.to_text() {
                        out.push_str(&text);
                    }
                }
            }
        }
        Ok(out)
    }
}
