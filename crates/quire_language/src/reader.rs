//! Lowers parsed [`Ast`] forms into the typed [`Program`].
//!
//! The reader checks the shape of every form and reports malformed ones as
//! parse errors carrying the offending source line. It does not resolve
//! scopes, expand macros or look up room names.

use std::sync::Arc;

use quire_foundation::{DiceExpr, Error, ErrorKind, Facing, Result, Value};

use crate::ast::Ast;
use crate::parser::{parse, parse_error};
use crate::span::Span;
use crate::syntax::{
    BinaryOp, Block, Decl, DeclScope, Expr, ExprKind, Ident, MacroDef, Metadata, OptionDef,
    Program, RoomDef, RoomRef, ScopeKind, Stmt, StmtKind, Template, TemplatePart, UnaryOp,
};

/// Label used by `(start-over)` when none is given.
pub const DEFAULT_START_OVER_LABEL: &str = "Start over";

/// Reads source text into a [`Program`].
///
/// # Errors
/// Returns a parse error for malformed source, or a compile error for a
/// duplicate metadata entry or an assignment to the world container.
pub fn read_program(source: &str) -> Result<Program> {
    let forms = parse(source)?;
    Reader::new(source).read(&forms)
}

/// Lowers AST forms, keeping the source around for error context.
pub struct Reader<'src> {
    source: &'src str,
}

impl<'src> Reader<'src> {
    /// Creates a reader over `source`.
    #[must_use]
    pub const fn new(source: &'src str) -> Self {
        Self { source }
    }

    /// Lowers every top-level form.
    ///
    /// # Errors
    /// Returns an error for any malformed form.
    pub fn read(&self, forms: &[Ast]) -> Result<Program> {
        let mut program = Program::default();
        for form in forms {
            let Some(elements) = form.as_list() else {
                return Err(self.error(
                    form.span(),
                    &format!("expected a top-level form, got {}", form.type_name()),
                ));
            };
            match form.head() {
                Some("meta") => self.read_meta(elements, form.span(), &mut program.metadata)?,
                Some("room") => program
                    .decls
                    .push(Decl::Room(self.read_room(elements, form.span())?)),
                Some("macro") => program
                    .decls
                    .push(Decl::Macro(self.read_macro(elements, form.span())?)),
                _ => {
                    return Err(self.error(
                        form.span(),
                        "expected (meta ...), (room ...) or (macro ...) at top level",
                    ));
                }
            }
        }
        Ok(program)
    }

    // =========================================================================
    // Top-level forms
    // =========================================================================

    fn read_meta(&self, elements: &[Ast], span: Span, metadata: &mut Metadata) -> Result<()> {
        let [_, tag, value] = elements else {
            return Err(self.error(span, "meta requires a tag and a string value"));
        };
        let Some(tag) = tag.as_symbol() else {
            return Err(self.error(tag.span(), "meta tag must be a symbol"));
        };
        let Some(value) = value.as_string() else {
            return Err(self.error(value.span(), "meta value must be a string"));
        };
        let value = value.trim().to_string();

        let slot = match tag {
            "Title" => &mut metadata.title,
            "Subtitle" => &mut metadata.subtitle,
            "Author" => &mut metadata.author,
            "License" => &mut metadata.license,
            "Note" => &mut metadata.note,
            "Library" => {
                metadata.libraries.push(value);
                return Ok(());
            }
            other => {
                return Err(self.error(span, &format!("unknown metadata tag: {other}")));
            }
        };
        if slot.is_some() {
            return Err(Error::new(ErrorKind::DuplicateMetadata(tag.to_string())));
        }
        *slot = Some(value);
        Ok(())
    }

    fn read_room(&self, elements: &[Ast], span: Span) -> Result<RoomDef> {
        let name = match elements.get(1) {
            Some(Ast::String(name, _)) if !name.trim().is_empty() => name.trim().to_string(),
            Some(other) => {
                return Err(self.error(other.span(), "room name must be a non-empty string"));
            }
            None => return Err(self.error(span, "room requires a name")),
        };
        Ok(RoomDef {
            name,
            body: self.read_stmts(&elements[2..])?,
            span,
        })
    }

    fn read_macro(&self, elements: &[Ast], span: Span) -> Result<MacroDef> {
        let Some(name) = elements.get(1).and_then(Ast::as_symbol) else {
            return Err(self.error(span, "macro requires a symbol name"));
        };
        Ok(MacroDef {
            name: name.to_string(),
            body: self.read_stmts(&elements[2..])?,
            span,
        })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn read_stmts(&self, forms: &[Ast]) -> Result<Vec<Stmt>> {
        forms.iter().map(|form| self.read_stmt(form)).collect()
    }

    fn read_block(&self, forms: &[Ast]) -> Result<Block> {
        Ok(Block::new(self.read_stmts(forms)?))
    }

    /// Lowers one statement form.
    ///
    /// # Errors
    /// Returns an error if the form is malformed.
    #[allow(clippy::too_many_lines)]
    pub fn read_stmt(&self, form: &Ast) -> Result<Stmt> {
        let span = form.span();
        let kind = match form {
            Ast::String(text, _) => StmtKind::Text(self.read_template(&dedent(text), span)?),
            Ast::List(elements, _) => match form.head() {
                Some("say") => {
                    let [_, expr] = elements.as_slice() else {
                        return Err(self.error(span, "say takes exactly one expression"));
                    };
                    StmtKind::Expr(self.read_expr(expr)?)
                }
                Some("set") => {
                    let [_, target, value] = elements.as_slice() else {
                        return Err(self.error(span, "set requires a target and a value"));
                    };
                    StmtKind::Assign {
                        target: self.read_assign_target(target)?,
                        value: self.read_expr(value)?,
                    }
                }
                Some("if") => {
                    let (cond, then, otherwise) = match elements.as_slice() {
                        [_, cond, then] => (cond, then, None),
                        [_, cond, then, otherwise] => (cond, then, Some(otherwise)),
                        _ => {
                            return Err(self.error(span, "if expects (if cond then [else])"));
                        }
                    };
                    StmtKind::If {
                        cond: self.read_expr(cond)?,
                        then: Block::new(vec![self.read_stmt(then)?]),
                        otherwise: otherwise
                            .map(|stmt| self.read_stmt(stmt).map(|s| Block::new(vec![s])))
                            .transpose()?,
                    }
                }
                Some("do") => StmtKind::Block(self.read_block(&elements[1..])?),
                Some("while") => {
                    let cond = self.required(elements, 1, span, "while requires a condition")?;
                    StmtKind::While {
                        cond: self.read_expr(cond)?,
                        body: self.read_block(&elements[2..])?,
                    }
                }
                Some("do-while") => {
                    let cond =
                        self.required(elements, 1, span, "do-while requires a condition")?;
                    StmtKind::DoWhile {
                        cond: self.read_expr(cond)?,
                        body: self.read_block(&elements[2..])?,
                    }
                }
                Some("for") => {
                    if elements.len() < 4 {
                        return Err(self.error(
                            span,
                            "for requires an init statement, a condition and a step statement",
                        ));
                    }
                    StmtKind::For {
                        init: Box::new(self.read_stmt(&elements[1])?),
                        cond: self.read_expr(&elements[2])?,
                        step: Box::new(self.read_stmt(&elements[3])?),
                        body: self.read_block(&elements[4..])?,
                    }
                }
                Some("for-each") => {
                    if elements.len() < 3 {
                        return Err(self.error(
                            span,
                            "for-each requires a variable and a collection",
                        ));
                    }
                    StmtKind::ForEach {
                        var: self.read_assign_target(&elements[1])?,
                        collection: self.read_expr(&elements[2])?,
                        body: self.read_block(&elements[3..])?,
                    }
                }
                Some("repeat") => {
                    let count = self.required(elements, 1, span, "repeat requires a count")?;
                    StmtKind::Repeat {
                        count: self.read_expr(count)?,
                        body: self.read_block(&elements[2..])?,
                    }
                }
                Some("once") => StmtKind::Once(self.read_block(&elements[1..])?),
                Some("scope") => self.read_scope(elements, span)?,
                Some("option") => {
                    let label = match elements.get(1) {
                        Some(Ast::String(label, label_span)) => {
                            self.read_template(label.trim(), *label_span)?
                        }
                        _ => return Err(self.error(span, "option requires a string label")),
                    };
                    StmtKind::Option(OptionDef {
                        label,
                        body: self.read_block(&elements[2..])?,
                        captures: Vec::new(),
                    })
                }
                Some("direction") => self.read_direction(elements, span)?,
                Some("goto") => {
                    let (target, facing) = match elements.as_slice() {
                        [_, target] => (target, None),
                        [_, target, facing] => (target, Some(self.read_facing(facing)?)),
                        _ => {
                            return Err(self.error(
                                span,
                                "goto requires a room name and an optional facing",
                            ));
                        }
                    };
                    StmtKind::Goto {
                        target: self.read_room_ref(target)?,
                        facing,
                    }
                }
                Some("macro") => StmtKind::MacroDef(self.read_macro(elements, span)?),
                Some("expand") => match elements.as_slice() {
                    [_, Ast::Symbol(name, _)] => StmtKind::Expand(name.clone()),
                    _ => return Err(self.error(span, "expand requires a macro name")),
                },
                Some("clear-options") => {
                    if elements.len() != 1 {
                        return Err(self.error(span, "clear-options takes no arguments"));
                    }
                    StmtKind::ClearOptions
                }
                Some("start-over") => match elements.as_slice() {
                    [_] => StmtKind::StartOver(Template::literal(DEFAULT_START_OVER_LABEL)),
                    [_, Ast::String(label, label_span)] => {
                        StmtKind::StartOver(self.read_template(label.trim(), *label_span)?)
                    }
                    _ => return Err(self.error(span, "start-over takes an optional string label")),
                },
                Some("comment") => match elements.as_slice() {
                    [_, Ast::String(text, _)] => StmtKind::Comment(text.clone()),
                    _ => return Err(self.error(span, "comment takes a single string")),
                },
                // Any other list is a call or operator used for its value.
                _ => StmtKind::Expr(self.read_expr(form)?),
            },
            _ => StmtKind::Expr(self.read_expr(form)?),
        };
        Ok(Stmt::new(kind, span))
    }

    fn read_scope(&self, elements: &[Ast], span: Span) -> Result<StmtKind> {
        let scope = match elements.get(1).and_then(Ast::as_symbol) {
            Some("world") => DeclScope::World,
            Some("room") => DeclScope::Room,
            _ => return Err(self.error(span, "scope must be followed by world or room")),
        };
        let mut names = Vec::new();
        for name in &elements[2..] {
            match name.as_symbol() {
                Some(n) if !n.contains('.') => names.push(Arc::from(n)),
                _ => return Err(self.error(name.span(), "scope names must be plain symbols")),
            }
        }
        if names.is_empty() {
            return Err(self.error(span, "scope requires at least one name"));
        }
        Ok(StmtKind::Scope { scope, names })
    }

    fn read_direction(&self, elements: &[Ast], span: Span) -> Result<StmtKind> {
        let (label, label_span) = match elements.get(1) {
            Some(Ast::String(label, label_span)) => (label.trim(), *label_span),
            _ => return Err(self.error(span, "direction requires a string label")),
        };
        let (target, facing) = match &elements[2..] {
            [] => (None, None),
            [target @ Ast::String(..)] => (Some(target), None),
            [facing @ Ast::Keyword(..)] => (None, Some(facing)),
            [target, facing] => (Some(target), Some(facing)),
            _ => {
                return Err(self.error(
                    span,
                    "direction takes a label, an optional room and an optional facing",
                ));
            }
        };
        let target = match target {
            Some(target) => self.read_room_ref(target)?,
            None => RoomRef {
                name: label.to_string(),
                span: label_span,
            },
        };
        Ok(StmtKind::Direction {
            label: self.read_template(label, label_span)?,
            target,
            facing: facing.map(|f| self.read_facing(f)).transpose()?,
        })
    }

    fn read_room_ref(&self, form: &Ast) -> Result<RoomRef> {
        match form {
            Ast::String(name, span) if !name.trim().is_empty() => Ok(RoomRef {
                name: name.trim().to_string(),
                span: *span,
            }),
            other => Err(self.error(other.span(), "expected a room name string")),
        }
    }

    fn read_facing(&self, form: &Ast) -> Result<Facing> {
        form.as_keyword()
            .and_then(|k| k.parse().ok())
            .ok_or_else(|| self.error(form.span(), "expected a facing keyword such as :n or :east"))
    }

    fn read_assign_target(&self, form: &Ast) -> Result<Ident> {
        match form.as_symbol() {
            Some("world") => Err(Error::new(ErrorKind::IllegalWorldAssignment)),
            Some(name) => self.read_ident(name, form.span()),
            None => Err(self.error(
                form.span(),
                &format!("expected a variable name, got {}", form.type_name()),
            )),
        }
    }

    fn required<'a>(
        &self,
        elements: &'a [Ast],
        index: usize,
        span: Span,
        message: &str,
    ) -> Result<&'a Ast> {
        elements.get(index).ok_or_else(|| self.error(span, message))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Lowers one expression form.
    ///
    /// # Errors
    /// Returns an error if the form is malformed.
    pub fn read_expr(&self, form: &Ast) -> Result<Expr> {
        let span = form.span();
        let kind = match form {
            Ast::Nil(_) => ExprKind::Literal(Value::Nil),
            Ast::Bool(b, _) => ExprKind::Literal(Value::Bool(*b)),
            Ast::Int(n, _) => ExprKind::Literal(Value::Int(*n)),
            Ast::Float(n, _) => ExprKind::Literal(Value::Float(*n)),
            Ast::String(s, _) => ExprKind::Literal(Value::from(s.as_str())),
            Ast::Keyword(k, _) => ExprKind::Literal(Value::from(k.as_str())),
            Ast::Symbol(name, _) => ExprKind::Var(self.read_ident(name, span)?),
            Ast::Dice(notation, _) => ExprKind::Dice(
                DiceExpr::parse(notation)
                    .map_err(|_| self.error(span, &format!("invalid dice: {notation}")))?,
            ),
            Ast::Vector(items, _) => ExprKind::List(
                items
                    .iter()
                    .map(|item| self.read_expr(item))
                    .collect::<Result<_>>()?,
            ),
            Ast::List(elements, _) => return self.read_form_expr(elements, span),
        };
        Ok(Expr::new(kind, span))
    }

    fn read_form_expr(&self, elements: &[Ast], span: Span) -> Result<Expr> {
        let Some((head, args)) = elements.split_first() else {
            return Err(self.error(span, "empty form is not an expression"));
        };
        let Some(name) = head.as_symbol() else {
            return Err(self.error(
                head.span(),
                &format!("cannot call a {}", head.type_name()),
            ));
        };
        let args: Vec<Expr> = args
            .iter()
            .map(|arg| self.read_expr(arg))
            .collect::<Result<_>>()?;

        let kind = match (name, args.len()) {
            ("if", 3) => {
                let mut args = args.into_iter();
                let mut next = || args.next().map(Box::new);
                match (next(), next(), next()) {
                    (Some(cond), Some(then), Some(otherwise)) => ExprKind::If {
                        cond,
                        then,
                        otherwise,
                    },
                    _ => return Err(self.error(span, "if requires three expressions")),
                }
            }
            ("if", _) => {
                return Err(self.error(
                    span,
                    "if in an expression requires a condition and two branches",
                ));
            }
            ("not", 1) | ("-", 1) => {
                let op = if name == "not" {
                    UnaryOp::Not
                } else {
                    UnaryOp::Neg
                };
                ExprKind::Unary {
                    op,
                    operand: Box::new(args.into_iter().next().ok_or_else(|| {
                        self.error(span, "missing operand")
                    })?),
                }
            }
            ("not", _) => return Err(self.error(span, "not takes exactly one operand")),
            _ => match BinaryOp::from_symbol(name) {
                Some(op) if op.is_comparison() && args.len() != 2 => {
                    return Err(self.error(
                        span,
                        &format!("{} takes exactly two operands", op.symbol()),
                    ));
                }
                Some(op) if args.len() < 2 => {
                    return Err(self.error(
                        span,
                        &format!("{} takes at least two operands", op.symbol()),
                    ));
                }
                Some(op) => return Ok(fold_binary(op, args, span)),
                None => ExprKind::Call {
                    name: name.to_string(),
                    args,
                },
            },
        };
        Ok(Expr::new(kind, span))
    }

    fn read_ident(&self, text: &str, span: Span) -> Result<Ident> {
        match text.split_once('.') {
            None if text == "world" || text == "room" => Err(self.error(
                span,
                &format!("{text} is a scope container, not a value; use {text}.name"),
            )),
            None => Ok(Ident::new(text)),
            Some((qualifier, name)) => {
                let scope = match qualifier {
                    "world" => ScopeKind::World,
                    "room" => ScopeKind::Room,
                    other => {
                        return Err(self.error(span, &format!("unknown scope qualifier: {other}")));
                    }
                };
                if name.is_empty() || name.contains('.') {
                    return Err(self.error(span, &format!("malformed identifier: {text}")));
                }
                Ok(Ident::qualified(name, scope))
            }
        }
    }

    /// Splits `{name}` interpolations out of text. `{{` and `}}` are literal
    /// braces.
    fn read_template(&self, text: &str, span: Span) -> Result<Template> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => {
                                return Err(self.error(span, "unterminated {...} in text"));
                            }
                        }
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(self.error(span, "empty {} in text"));
                    }
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Lit(std::mem::take(&mut literal)));
                    }
                    parts.push(TemplatePart::Var(self.read_ident(name, span)?));
                }
                '}' => return Err(self.error(span, "unmatched } in text; write }} for a brace")),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() || parts.is_empty() {
            parts.push(TemplatePart::Lit(literal));
        }
        Ok(Template { parts })
    }

    fn error(&self, span: Span, message: &str) -> Error {
        parse_error(self.source, span, message)
    }
}

/// Folds `(op a b c)` into `((a op b) op c)`.
fn fold_binary(op: BinaryOp, args: Vec<Expr>, span: Span) -> Expr {
    let mut args = args.into_iter();
    let first = args.next().unwrap_or(Expr::new(ExprKind::Literal(Value::Nil), span));
    args.fold(first, |left, right| {
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    })
}

/// Removes the common indentation of every line after the first, then trims
/// the result.
#[must_use]
pub fn dedent(text: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();
    let indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = String::from(first.trim_end());
    for line in rest {
        out.push('\n');
        if line.len() >= indent {
            out.push_str(line[indent..].trim_end());
        } else {
            out.push_str(line.trim());
        }
    }
    out.trim().to_string()
}
