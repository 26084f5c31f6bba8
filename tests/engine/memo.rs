//! Integration tests for content hashing and the node index

use std::sync::Arc;

use quire_engine::{Bindings, ContentHash, NodeIndex, Origin};
use quire_foundation::{Facing, NodeId, OptionId, RoomId, Value};

fn hash(origin: Origin, facing: Facing, state: &[u8]) -> ContentHash {
    ContentHash::compute(origin, facing, state, None).unwrap()
}

// =============================================================================
// Content Hash
// =============================================================================

#[test]
fn equal_inputs_hash_equal() {
    let a = hash(Origin::Room(RoomId(0)), Facing::North, b"state");
    let b = hash(Origin::Room(RoomId(0)), Facing::North, b"state");
    assert_eq!(a, b);
    assert_eq!(a.to_hex().len(), 64);
}

#[test]
fn every_input_contributes() {
    let base = hash(Origin::Room(RoomId(0)), Facing::North, b"state");
    assert_ne!(base, hash(Origin::Room(RoomId(1)), Facing::North, b"state"));
    assert_ne!(base, hash(Origin::Option(OptionId(0)), Facing::North, b"state"));
    assert_ne!(base, hash(Origin::Room(RoomId(0)), Facing::East, b"state"));
    assert_ne!(base, hash(Origin::Room(RoomId(0)), Facing::North, b"other"));
}

#[test]
fn captured_locals_are_hashed() {
    let origin = Origin::Option(OptionId(3));
    let mut one = Bindings::new();
    one.insert(Arc::from("x"), Value::Int(1));
    let mut two = Bindings::new();
    two.insert(Arc::from("x"), Value::Int(2));

    let a = ContentHash::compute(origin, Facing::North, b"s", Some(&one)).unwrap();
    let b = ContentHash::compute(origin, Facing::North, b"s", Some(&two)).unwrap();
    let c = ContentHash::compute(origin, Facing::North, b"s", Some(&one)).unwrap();
    assert_ne!(a, b);
    assert_eq!(a, c);
}

// =============================================================================
// Node Index
// =============================================================================

#[test]
fn index_counts_hits_and_misses() {
    let mut index = NodeIndex::new();
    let key = hash(Origin::Room(RoomId(0)), Facing::North, b"s");

    assert_eq!(index.lookup(&key), None);
    index.insert(key, NodeId(0));
    assert_eq!(index.lookup(&key), Some(NodeId(0)));
    assert_eq!(index.get(&key), Some(NodeId(0)));
    assert_eq!((index.hits(), index.misses()), (1, 1));
}

#[test]
fn first_registration_wins() {
    let mut index = NodeIndex::new();
    let key = hash(Origin::Room(RoomId(2)), Facing::West, b"s");
    assert_eq!(index.insert(key, NodeId(4)), NodeId(4));
    assert_eq!(index.insert(key, NodeId(9)), NodeId(4));
    assert_eq!(index.len(), 1);
}
