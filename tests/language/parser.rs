//! Integration tests for the parser
//!
//! Tests the S-expression layer on complete scripts.

use quire_foundation::ErrorKind;
use quire_language::{Ast, parse};

const SCRIPT: &str = r#"
(meta Title "Caves")
; two rooms
(room "Start"
  "You wake."
  (option "Go" (goto "End")))
(room "End" "Done.")
"#;

// =============================================================================
// Structure
// =============================================================================

#[test]
fn top_level_forms_in_order() {
    let forms = parse(SCRIPT).unwrap();
    let heads: Vec<_> = forms.iter().map(|f| f.head()).collect();
    assert_eq!(heads, vec![Some("meta"), Some("room"), Some("room")]);
}

#[test]
fn nested_forms_keep_their_shape() {
    let forms = parse(SCRIPT).unwrap();
    let start = forms[1].as_list().unwrap();
    assert_eq!(start[1].as_string(), Some("Start"));
    assert_eq!(start[2].as_string(), Some("You wake."));

    let option = start[3].as_list().unwrap();
    assert_eq!(option[0].as_symbol(), Some("option"));
    assert_eq!(option[2].head(), Some("goto"));
}

#[test]
fn spans_point_into_the_source() {
    let forms = parse(SCRIPT).unwrap();
    let span = forms[2].span();
    assert!(SCRIPT[span.start..span.end].starts_with("(room \"End\""));
    assert_eq!(span.line, 7);
}

#[test]
fn vectors_and_atoms() {
    let forms = parse("[1 2.5 \"s\" :n nil true 2d6 x]").unwrap();
    match &forms[0] {
        Ast::Vector(items, _) => {
            assert_eq!(items.len(), 8);
            assert!(matches!(items[4], Ast::Nil(_)));
            assert!(matches!(&items[6], Ast::Dice(d, _) if d == "2d6"));
        }
        other => panic!("expected vector, got {other:?}"),
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn unclosed_room_is_a_parse_error() {
    let err = parse("(room \"A\"\n  \"text\"").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ParseError { .. }));
    assert!(err.is_compile_error());
}

#[test]
fn lexer_errors_surface_as_parse_errors() {
    let err = parse("(room \"A\" #)").unwrap_err();
    match err.kind {
        ErrorKind::ParseError { line, column, .. } => assert_eq!((line, column), (1, 11)),
        other => panic!("expected parse error, got {other:?}"),
    }
}
