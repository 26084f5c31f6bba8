//! Integration tests for the execution state store
//!
//! Tests snapshots, canonical bytes, the recursion ceiling and random streams.

use std::sync::Arc;

use proptest::prelude::*;
use quire_engine::{EngineConfig, ExecutionState, RngState};
use quire_foundation::{ErrorKind, Facing, Item, RoomId, SemanticLimit, Value};
use rand::Rng;

fn state(rooms: usize) -> ExecutionState {
    ExecutionState::new(rooms, &EngineConfig::new().with_recursion_limit(3))
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn every_room_starts_empty_with_its_own_stream() {
    let state = state(3);
    assert_eq!(state.depth(), 0);
    assert_eq!(state.facing(), Facing::North);
    for index in 0..3 {
        let room = state.room(RoomId(index)).unwrap();
        assert!(room.vars.is_empty());
        assert!(room.items.is_empty());
    }
    assert_ne!(
        state.rng_state(RoomId(0)).unwrap(),
        state.rng_state(RoomId(1)).unwrap()
    );
    assert!(state.rng_state(RoomId(7)).is_err());
}

#[test]
fn seeds_follow_the_configured_seed() {
    let config = EngineConfig::new().with_seed(100);
    let state = ExecutionState::new(2, &config);
    assert_eq!(state.rng_state(RoomId(1)).unwrap(), RngState::seeded(102));
}

// =============================================================================
// Snapshot and Restore
// =============================================================================

#[test]
fn restore_undoes_every_change() {
    let mut state = state(2);
    state.set_world(Arc::from("gold"), Value::Int(1));
    let snapshot = state.snapshot();
    let before = state.canonical_bytes().unwrap();

    state.set_world(Arc::from("gold"), Value::Int(2));
    state.set_room_var(RoomId(1), Arc::from("seen"), Value::Bool(true));
    state.add_item(RoomId(0), Item::new("Key"));
    assert!(state.mark_once(RoomId(0), 0));
    state.set_facing(Facing::West);
    state.enter_room("A").unwrap();
    let mut stream = state.rng_state(RoomId(0)).unwrap();
    let mut rng = stream.stream();
    let _: u32 = rng.r#gen();
    stream.advance_to(&rng);
    state.set_rng_state(RoomId(0), stream);
    assert_ne!(state.canonical_bytes().unwrap(), before);

    state.restore(snapshot.clone());
    assert_eq!(state.snapshot(), snapshot);
    assert_eq!(state.canonical_bytes().unwrap(), before);
    assert_eq!(state.world("gold"), Some(&Value::Int(1)));
    assert_eq!(state.facing(), Facing::North);
    assert_eq!(state.depth(), 0);
}

#[test]
fn snapshot_bytes_match_state_bytes() {
    let mut state = state(1);
    state.set_room_var(RoomId(0), Arc::from("n"), Value::Int(5));
    assert_eq!(
        state.snapshot().canonical_bytes().unwrap(),
        state.canonical_bytes().unwrap()
    );
}

#[test]
fn depth_and_facing_are_not_hashed() {
    let mut state = state(1);
    let before = state.canonical_bytes().unwrap();
    state.enter_room("A").unwrap();
    state.set_facing(Facing::South);
    assert_eq!(state.canonical_bytes().unwrap(), before);
    assert_eq!(state.snapshot().depth(), 1);
    assert_eq!(state.snapshot().facing(), Facing::South);
}

#[test]
fn insertion_order_does_not_change_bytes() {
    let mut a = state(1);
    a.set_world(Arc::from("x"), Value::Int(1));
    a.set_world(Arc::from("y"), Value::Int(2));
    let mut b = state(1);
    b.set_world(Arc::from("y"), Value::Int(2));
    b.set_world(Arc::from("x"), Value::Int(1));
    assert_eq!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
}

proptest! {
    #[test]
    fn restore_of_snapshot_is_identity(
        values in prop::collection::vec((0u8..4, any::<i64>()), 0..12),
    ) {
        let mut state = state(2);
        for (slot, value) in &values {
            let name: Arc<str> = Arc::from(format!("v{slot}"));
            if slot % 2 == 0 {
                state.set_world(name, Value::Int(*value));
            } else {
                state.set_room_var(RoomId(1), name, Value::Int(*value));
            }
        }
        let before = state.clone();
        let snapshot = state.snapshot();
        state.set_world(Arc::from("noise"), Value::Nil);
        state.restore(snapshot);
        prop_assert_eq!(state, before);
    }
}

// =============================================================================
// Recursion Ceiling
// =============================================================================

#[test]
fn ceiling_stops_further_nesting() {
    let mut state = state(1);
    for _ in 0..3 {
        state.enter_room("Deep").unwrap();
    }
    let err = state.enter_room("Deep").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::RecursionDepth { limit: 3, ref room })
            if room == "Deep"
    ));
    assert_eq!(state.depth(), 3);

    state.exit_room();
    assert_eq!(state.depth(), 2);
    state.enter_room("Deep").unwrap();
}

#[test]
fn exit_never_underflows() {
    let mut state = state(1);
    state.exit_room();
    assert_eq!(state.depth(), 0);
}

// =============================================================================
// Room State
// =============================================================================

#[test]
fn once_fires_once() {
    let mut state = state(1);
    assert!(state.mark_once(RoomId(0), 4));
    assert!(!state.mark_once(RoomId(0), 4));
    assert!(state.mark_once(RoomId(0), 5));
}

#[test]
fn items_are_a_set() {
    let mut state = state(1);
    state.add_item(RoomId(0), Item::new("Key"));
    state.add_item(RoomId(0), Item::new("Key"));
    assert_eq!(state.room(RoomId(0)).unwrap().items.len(), 1);
}

#[test]
fn streams_replay_from_their_position() {
    let stream = RngState::seeded(5);
    let mut first = stream.stream();
    let a: u64 = first.r#gen();
    let mut saved = stream;
    saved.advance_to(&first);
    let b: u64 = first.r#gen();

    assert_eq!(saved.stream().r#gen::<u64>(), b);
    assert_eq!(stream.stream().r#gen::<u64>(), a);
}
