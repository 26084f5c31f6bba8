//! Integration tests for the traversal driver
//!
//! Tests graph shape, memoization, scope isolation and fatal ceilings on
//! complete scripts.

use std::sync::Arc;

use quire_engine::{EngineConfig, Node, NodeGraph, Traversal, compile, expand_source};
use quire_foundation::{Error, ErrorKind, NodeId, RoomId, SemanticLimit};

fn config() -> EngineConfig {
    EngineConfig::new().with_recursion_limit(32)
}

fn run(source: &str) -> NodeGraph {
    expand_source(source, config()).unwrap_or_else(|e| panic!("traversal failed: {e}"))
}

fn run_err(source: &str) -> Error {
    expand_source(source, config()).expect_err("traversal should fail")
}

fn child<'g>(graph: &'g NodeGraph, node: &Node, label: &str) -> &'g Node {
    let id: NodeId = node
        .children
        .iter()
        .find(|c| c.label == label)
        .unwrap_or_else(|| panic!("no choice {label}"))
        .target;
    graph.get(id).unwrap()
}

// =============================================================================
// Graph Shape
// =============================================================================

#[test]
fn start_with_two_exits() {
    let graph = run(r#"
        (room "Start" "Hello"
          (option "Go North" (goto "North"))
          (option "Go South" (goto "South")))
        (room "North" "Cold wind")
        (room "South" "Warm sun")
    "#);
    assert_eq!(graph.len(), 3);
    let start = graph.entry_node().unwrap();
    let labels: Vec<_> = start.children.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Go North", "Go South"]);
    assert_eq!(child(&graph, start, "Go North").text, "Cold wind");
    assert_eq!(child(&graph, start, "Go South").text, "Warm sun");
}

#[test]
fn goto_reads_as_one_page() {
    let graph = run(r#"
        (room "A" "Before" (goto "B"))
        (room "B" "After")
    "#);
    assert_eq!(graph.inline_text(graph.entry()), "Before\n\nAfter");
    assert!(graph.entry_node().unwrap().children.is_empty());
}

#[test]
fn choice_order_ignores_declaration_order() {
    let graph = run(r#"
        (room "Start"
          (option "Zebra" (goto "End"))
          (option "Apple" (goto "End"))
          (direction "Mango" "End"))
        (room "End" "x")
    "#);
    let labels: Vec<_> = graph
        .entry_node()
        .unwrap()
        .children
        .iter()
        .map(|c| c.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Apple", "Mango", "Zebra"]);
}

// =============================================================================
// Memoization
// =============================================================================

#[test]
fn shared_room_is_rendered_once() {
    let source = r#"
        (room "Start"
          (option "A" (goto "A"))
          (option "B" (goto "B")))
        (room "A" "From A" (goto "C"))
        (room "B" "From B" (goto "C"))
        (room "C" "Shared end")
    "#;
    let program = compile(&quire_language::load(source).unwrap()).unwrap();
    let (graph, stats) = Traversal::new(Arc::new(program), config())
        .run_from(RoomId(0))
        .unwrap();
    assert_eq!(graph.room_nodes(RoomId(3)).count(), 1);
    assert!(stats.memo_hits >= 1);
    assert_eq!(stats.nodes, graph.len());
}

#[test]
fn equal_state_converges() {
    let graph = run(r#"
        (room "Start" (scope world coins) (set coins 0)
          (option "Left" (set coins 1) (goto "Vault"))
          (option "Right" (set coins 1) (goto "Vault")))
        (room "Vault" "Coins {coins}")
    "#);
    let start = graph.entry_node().unwrap();
    assert_eq!(start.children[0].target, start.children[1].target);
    assert_eq!(graph.room_nodes(RoomId(1)).count(), 1);
}

#[test]
fn different_state_diverges() {
    let graph = run(r#"
        (room "Start" (scope world coins) (set coins 0)
          (option "Left" (set coins 1) (goto "Vault"))
          (option "Right" (set coins 2) (goto "Vault")))
        (room "Vault" "Coins {coins}")
    "#);
    let start = graph.entry_node().unwrap();
    assert_eq!(child(&graph, start, "Left").text, "Coins 1");
    assert_eq!(child(&graph, start, "Right").text, "Coins 2");
    assert_eq!(graph.room_nodes(RoomId(1)).count(), 2);
}

#[test]
fn room_state_persists_across_visits() {
    let graph = run(r#"
        (room "Hall"
          (scope room visits)
          (once (set visits 0))
          (set visits (+ visits 1))
          "Visit {visits}"
          (if (< visits 3) (option "Again" (goto "Hall"))))
    "#);
    assert_eq!(graph.len(), 3);
    let first = graph.entry_node().unwrap();
    let second = child(&graph, first, "Again");
    let third = child(&graph, second, "Again");
    assert_eq!(
        [first.text.as_str(), second.text.as_str(), third.text.as_str()],
        ["Visit 1", "Visit 2", "Visit 3"]
    );
    assert!(third.children.is_empty());
}

// =============================================================================
// Scope Isolation
// =============================================================================

#[test]
fn option_locals_stay_in_the_option() {
    let err = run_err(r#"
        (room "A" (option "Go" (set t 1) (goto "B")) "{t}")
        (room "B" "b")
    "#);
    assert!(matches!(err.kind, ErrorKind::UnboundVariable(ref name) if name == "t"));
}

#[test]
fn room_changes_do_not_leak_to_the_caller() {
    let graph = run(r#"
        (room "Start" (scope world hp) (set hp 10)
          (option "Fight" (goto "Fight"))
          (option "Rest" (goto "Rest")))
        (room "Fight" (set hp (- hp 5)) "HP {hp}")
        (room "Rest" "HP {hp}")
    "#);
    let start = graph.entry_node().unwrap();
    assert_eq!(child(&graph, start, "Fight").text, "HP 5");
    assert_eq!(child(&graph, start, "Rest").text, "HP 10");
}

// =============================================================================
// Facing and Seeds
// =============================================================================

#[test]
fn facing_carries_through_goto() {
    let graph = run(r#"
        (room "A" (face :e) (goto "B"))
        (room "B" (say (compass)) (say (direction-label :s)))
    "#);
    assert_eq!(
        graph.inline_text(graph.entry()),
        "east\n\nTurn right and continue."
    );
}

#[test]
fn seed_selects_the_dice() {
    let source = r#"(room "R" (say 1d1000000) (say 1d1000000))"#;
    let a = expand_source(source, config().with_seed(1)).unwrap();
    let b = expand_source(source, config().with_seed(1)).unwrap();
    let c = expand_source(source, config().with_seed(2)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.entry_node().unwrap().text, c.entry_node().unwrap().text);
}

// =============================================================================
// Fatal Ceilings
// =============================================================================

#[test]
fn unconditional_self_goto_is_fatal() {
    let err = run_err(r#"(room "Loop" "Again" (goto "Loop"))"#);
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::CyclicGoto { .. })
    ));
}

#[test]
fn unbounded_state_growth_hits_the_ceiling() {
    let err = run_err(r#"
        (room "Start" (scope world n) (set n 0) (goto "Loop"))
        (room "Loop" (set n (+ n 1)) (goto "Loop"))
    "#);
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::RecursionDepth { limit: 32, .. })
    ));
}

#[test]
fn default_ceiling_holds_for_goto_loops() {
    let err = expand_source(
        r#"
        (room "Start" (scope world n) (set n 0) (goto "Loop"))
        (room "Loop" (set n (+ n 1)) (goto "Loop"))
    "#,
        EngineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::RecursionDepth { limit: 1000, ref room })
            if room == "Loop"
    ));
}

#[test]
fn default_ceiling_holds_for_option_loops() {
    let err = expand_source(
        r#"
        (room "Start" (scope world n) (set n 0) (goto "Loop"))
        (room "Loop" (option "again" (set n (+ n 1))))
    "#,
        EngineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::RecursionDepth { limit: 1000, .. })
    ));
    assert!(err.context.is_some_and(|c| c.stack.iter().any(|f| f == "option \"again\"")));
}

#[test]
fn long_chains_fit_under_the_default_ceiling() {
    let rooms: String = (0..200)
        .map(|i| format!(r#"(room "R{i}" "Page {i}" (option "next" (goto "R{}")))"#, i + 1))
        .chain(std::iter::once(r#"(room "R200" "The end.")"#.to_string()))
        .collect::<Vec<_>>()
        .join("\n");
    let graph = expand_source(&rooms, EngineConfig::default()).unwrap();
    assert_eq!(graph.len(), 201);
}

#[test]
fn compile_errors_stop_before_traversal() {
    let err = run_err(r#"(room "A" (goto "Nowhere"))"#);
    assert!(err.is_compile_error());
    let err = run_err(r#"(room "A") (room "A")"#);
    assert!(matches!(err.kind, ErrorKind::DuplicateRoom(ref name) if name == "A"));
}
