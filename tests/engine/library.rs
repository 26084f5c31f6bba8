//! Integration tests for rule library calls made from scripts

use quire_engine::{EngineConfig, expand_source};
use quire_foundation::{Error, ErrorKind};

fn page(source: &str) -> String {
    let graph = expand_source(source, EngineConfig::new().with_recursion_limit(16))
        .unwrap_or_else(|e| panic!("traversal failed: {e}"));
    graph.inline_text(graph.entry())
}

fn failure(source: &str) -> Error {
    expand_source(source, EngineConfig::new().with_recursion_limit(16))
        .expect_err("traversal should fail")
}

// =============================================================================
// Core Library
// =============================================================================

#[test]
fn core_functions_need_no_import() {
    let text = page(
        r#"(room "R"
             (say (upper "abc"))
             (say (len [1 2 3]))
             (say (max 1 5 3))
             (say (contains [1 2] 2))
             (say (str "a" 1 nil "b")))"#,
    );
    assert_eq!(text, "ABC\n\n3\n\n5\n\ntrue\n\na1b");
}

#[test]
fn items_become_the_inventory_line() {
    let text = page(r#"(room "R" "A shelf." (item "Lamp") (item "Apple"))"#);
    assert_eq!(text, "A shelf.\n\nItems: Apple, Lamp");
}

#[test]
fn arity_is_checked_at_compile_time() {
    let err = failure(r#"(room "R" (say (len)))"#);
    assert!(matches!(err.kind, ErrorKind::ArityMismatch { ref function, .. } if function == "len"));
}

// =============================================================================
// Rules Library
// =============================================================================

#[test]
fn rules_require_an_import() {
    let err = failure(r#"(room "R" (say (roll "1d6")))"#);
    assert!(matches!(err.kind, ErrorKind::UnknownFunction(ref name) if name == "roll"));
}

#[test]
fn unknown_library_is_rejected() {
    let err = failure(r#"(meta Library "spells") (room "R")"#);
    assert!(matches!(err.kind, ErrorKind::UnknownLibrary(ref name) if name == "spells"));
}

#[test]
fn rules_functions_from_a_script() {
    let text = page(
        r#"(meta Library "rules")
           (room "R"
             (say (initiative))
             (say (dl-check "Easy" 100))
             (if (stat-check 1) "steady" "shaky"))"#,
    );
    let parts: Vec<&str> = text.split("\n\n").collect();
    assert!(parts[0] == "PLAYER" || parts[0] == "NPC");
    assert!(parts[1].starts_with("PASS"));
    assert_eq!(parts[2], "steady");
}

#[test]
fn roll_stays_in_range() {
    let text = page(r#"(meta Library "rules") (room "R" (say (roll "2d6+1")))"#);
    let total: i64 = text.parse().unwrap();
    assert!((3..=13).contains(&total));
}

#[test]
fn bad_difficulty_names_the_room() {
    let err = failure(r#"(meta Library "rules") (room "Gate" (say (dl-check "Impossible")))"#);
    assert!(matches!(err.kind, ErrorKind::InvalidArgument { .. }));
    let stack = err.context.map(|c| c.stack).unwrap_or_default();
    assert!(stack.iter().any(|frame| frame == "room Gate"));
}
