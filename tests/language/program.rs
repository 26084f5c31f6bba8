//! Integration tests for reading and resolving whole programs
//!
//! Tests metadata, statement forms, scope classification and macros.

use proptest::prelude::*;
use quire_foundation::{ErrorKind, Facing};
use quire_language::{ScopeKind, Stmt, StmtKind, TemplatePart, load};

fn assigned_scope(stmt: &Stmt) -> ScopeKind {
    match &stmt.kind {
        StmtKind::Assign { target, .. } => target.scope,
        other => panic!("expected assignment, got {other:?}"),
    }
}

// =============================================================================
// Metadata and Rooms
// =============================================================================

#[test]
fn metadata_and_rooms_in_source_order() {
    let program = load(
        r#"(meta Title "Caves")
           (meta Subtitle "Deep")
           (meta Author "Someone")
           (meta Library "rules")
           (room "Start" "Hi")
           (room "End" "Bye")"#,
    )
    .unwrap();
    assert_eq!(program.metadata.title.as_deref(), Some("Caves"));
    assert_eq!(program.metadata.subtitle.as_deref(), Some("Deep"));
    assert_eq!(program.metadata.libraries, vec!["rules"]);
    let names: Vec<_> = program.rooms.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Start", "End"]);
}

#[test]
fn every_statement_form_reads() {
    let program = load(
        r#"(room "All"
             "text {n}"
             (say 1)
             (set n 1)
             (if n "yes" "no")
             (do "a" "b")
             (while (< n 3) (set n (+ n 1)))
             (do-while (> n 0) (set n (- n 1)))
             (for (set i 0) (< i 2) (set i (+ i 1)) "{i}")
             (for-each x [1 2] "{x}")
             (repeat 2 "again")
             (once "first")
             (scope room visits)
             (option "Go" (goto "All" :e))
             (direction "North" "All" :n)
             (clear-options)
             (start-over)
             (comment "ignored"))"#,
    )
    .unwrap();
    let kinds: Vec<&str> = program.rooms[0]
        .body
        .iter()
        .map(|s| match &s.kind {
            StmtKind::Text(_) => "text",
            StmtKind::Expr(_) => "expr",
            StmtKind::Assign { .. } => "set",
            StmtKind::If { .. } => "if",
            StmtKind::Block(_) => "do",
            StmtKind::While { .. } => "while",
            StmtKind::DoWhile { .. } => "do-while",
            StmtKind::For { .. } => "for",
            StmtKind::ForEach { .. } => "for-each",
            StmtKind::Repeat { .. } => "repeat",
            StmtKind::Once(_) => "once",
            StmtKind::Scope { .. } => "scope",
            StmtKind::Option(_) => "option",
            StmtKind::Direction { .. } => "direction",
            StmtKind::Goto { .. } => "goto",
            StmtKind::MacroDef(_) => "macro",
            StmtKind::Expand(_) => "expand",
            StmtKind::ClearOptions => "clear-options",
            StmtKind::StartOver(_) => "start-over",
            StmtKind::Comment(_) => "comment",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "text",
            "expr",
            "set",
            "if",
            "do",
            "while",
            "do-while",
            "for",
            "for-each",
            "repeat",
            "once",
            "scope",
            "option",
            "direction",
            "clear-options",
            "start-over",
            "comment",
        ]
    );

    match &program.rooms[0].body[12].kind {
        StmtKind::Option(def) => match &def.body.stmts[0].kind {
            StmtKind::Goto { target, facing } => {
                assert_eq!(target.name, "All");
                assert_eq!(*facing, Some(Facing::East));
            }
            other => panic!("expected goto, got {other:?}"),
        },
        other => panic!("expected option, got {other:?}"),
    }
}

// =============================================================================
// Scope Resolution
// =============================================================================

#[test]
fn world_room_and_local_scopes() {
    let program = load(
        r#"(room "A"
             (scope world gold)
             (scope room visits)
             (set gold 1)
             (set visits 1)
             (set temp 1))
           (room "B"
             (set gold 2)
             (set visits 2))"#,
    )
    .unwrap();
    let a = &program.rooms[0].body;
    assert_eq!(assigned_scope(&a[2]), ScopeKind::World);
    assert_eq!(assigned_scope(&a[3]), ScopeKind::Room);
    assert_eq!(assigned_scope(&a[4]), ScopeKind::Local);

    let b = &program.rooms[1].body;
    assert_eq!(assigned_scope(&b[0]), ScopeKind::World);
    assert_eq!(assigned_scope(&b[1]), ScopeKind::Local);
}

#[test]
fn qualified_names_keep_their_scope() {
    let program = load(r#"(room "A" (set room.count 1) "{world.gold}")"#).unwrap();
    let body = &program.rooms[0].body;
    assert_eq!(assigned_scope(&body[0]), ScopeKind::Room);
    match &body[1].kind {
        StmtKind::Text(t) => {
            assert!(matches!(&t.parts[0], TemplatePart::Var(i) if i.scope == ScopeKind::World));
        }
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn options_capture_locals_defined_before_them() {
    let program = load(
        r#"(room "A"
             (set before 1)
             (option "Go" "{before}")
             (set after 2))"#,
    )
    .unwrap();
    match &program.rooms[0].body[1].kind {
        StmtKind::Option(def) => {
            let captures: Vec<&str> = def.captures.iter().map(|c| &**c).collect();
            assert_eq!(captures, vec!["before"]);
        }
        other => panic!("expected option, got {other:?}"),
    }
}

// =============================================================================
// Macros
// =============================================================================

#[test]
fn macros_expand_in_place() {
    let program = load(
        r#"(macro footer "-- end --" (clear-options))
           (room "A" "Body" (expand footer))"#,
    )
    .unwrap();
    let body = &program.rooms[0].body;
    assert_eq!(body.len(), 3);
    assert!(matches!(body[2].kind, StmtKind::ClearOptions));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn compile_errors_from_load() {
    let cases = [
        ("", "empty"),
        (r#"(meta Author "A") (meta Author "B") (room "R")"#, "metadata"),
        (r#"(room "R" (set world 1))"#, "world"),
        (r#"(room "R" (expand missing))"#, "macro"),
        (r#"(room "R" (bogus-form"#, "parse"),
    ];
    for (source, label) in cases {
        let err = load(source).unwrap_err();
        assert!(err.is_compile_error(), "{label}: {err}");
    }
}

#[test]
fn errors_carry_a_position() {
    let err = load("(room \"R\"\n  (goto))").unwrap_err();
    match err.kind {
        ErrorKind::ParseError { line, context, .. } => {
            assert_eq!(line, 2);
            assert_eq!(context, "  (goto))");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn load_never_panics(s in "[()\\[\\]\" a-z0-9:.{}+\\-]{0,48}") {
        let _ = load(&s);
    }
}
