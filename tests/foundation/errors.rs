//! Integration tests for Error types
//!
//! Tests error kinds, compile-time classification and context display.

use quire_foundation::{Error, ErrorContext, ErrorKind, SemanticLimit, Type};

// =============================================================================
// Construction and Display
// =============================================================================

#[test]
fn unknown_room_names_both_ends() {
    let err = Error::unknown_room("Cellar", "Hall");
    assert_eq!(err.to_string(), "unknown room 'Cellar' referenced from Hall");
}

#[test]
fn type_mismatch_display() {
    let err = Error::type_mismatch(Type::Int, Type::String);
    assert!(matches!(
        err.kind,
        ErrorKind::TypeMismatch {
            expected: Type::Int,
            actual: Type::String
        }
    ));
}

#[test]
fn limits_display_the_room() {
    let err = Error::limit_exceeded(SemanticLimit::RecursionDepth {
        limit: 10,
        room: "Loop".to_string(),
    });
    let text = err.to_string();
    assert!(text.contains("10"));
    assert!(text.contains("Loop"));
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn structural_errors_are_compile_errors() {
    assert!(Error::duplicate_room("A").is_compile_error());
    assert!(Error::unknown_room("A", "B").is_compile_error());
    assert!(Error::duplicate_macro("m").is_compile_error());
    assert!(Error::new(ErrorKind::IllegalWorldAssignment).is_compile_error());
    assert!(Error::new(ErrorKind::EmptyProgram).is_compile_error());
}

#[test]
fn runtime_errors_are_not_compile_errors() {
    assert!(!Error::unbound_variable("x").is_compile_error());
    assert!(!Error::new(ErrorKind::DivisionByZero).is_compile_error());
    assert!(
        !Error::limit_exceeded(SemanticLimit::CyclicGoto {
            room: "A".to_string()
        })
        .is_compile_error()
    );
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn frames_stack_innermost_first() {
    let err = Error::unbound_variable("x")
        .in_frame("option \"Left\"")
        .in_frame("room Hall");
    let context = err.context.unwrap();
    assert_eq!(context.stack, vec!["option \"Left\"", "room Hall"]);
}

#[test]
fn context_display_includes_position_and_frames() {
    let context = ErrorContext::new()
        .with_source("cave.qb")
        .with_position(3, 7)
        .with_frame("room Cave");
    let text = context.to_string();
    assert!(text.starts_with("at cave.qb:3:7"));
    assert!(text.contains("in room Cave"));
}
