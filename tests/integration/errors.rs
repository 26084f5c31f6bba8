//! Error reporting across layers
//!
//! Tests that errors raised anywhere in a build keep their kind and carry
//! enough context to find the offending source.

use quire::engine::EngineConfig;
use quire::foundation::{Error, ErrorKind, SemanticLimit};
use quire::runtime::Book;

fn build_err(source: &str) -> Error {
    Book::build(source, &EngineConfig::new().with_recursion_limit(16))
        .expect_err("build should fail")
}

#[test]
fn parse_errors_point_at_the_line() {
    let err = build_err("(room \"A\"\n  \"text\"\n  (option))");
    match err.kind {
        ErrorKind::ParseError { line, .. } => assert_eq!(line, 3),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn runtime_errors_name_every_room_on_the_way() {
    let err = build_err(
        r#"(room "A" (goto "B"))
           (room "B" (say (/ 1 0)))"#,
    );
    assert!(matches!(err.kind, ErrorKind::DivisionByZero));
    assert!(!err.is_compile_error());
    let stack = err.context.map(|c| c.stack).unwrap_or_default();
    assert!(stack.iter().any(|f| f == "room B"));
    assert!(stack.iter().any(|f| f == "room A"));
}

#[test]
fn ceilings_abort_the_whole_build() {
    let err = build_err(
        r#"(room "Up" (scope world n) (set n 0) (goto "Climb"))
           (room "Climb" (set n (+ n 1)) (option "Higher" (goto "Climb")) (goto "Climb"))"#,
    );
    assert!(matches!(err.kind, ErrorKind::LimitExceeded(SemanticLimit::RecursionDepth { .. })));
}

#[test]
fn unknown_rooms_are_compile_errors() {
    let err = build_err(r#"(room "A" (option "Go" (goto "Nowhere")))"#);
    assert!(err.is_compile_error());
    assert!(matches!(err.kind, ErrorKind::UnknownRoom { ref name, .. } if name == "Nowhere"));
}
