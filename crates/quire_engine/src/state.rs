//! The execution state store.
//!
//! [`ExecutionState`] holds everything a room handler can change: world
//! bindings, per-room bindings, once-sets and items, per-room random streams,
//! the reader's facing and the recursion depth. Every collection is an `im`
//! persistent structure, so [`ExecutionState::snapshot`] is a constant-time
//! clone and forking a branch never copies the whole state.
//!
//! Canonical bytes (MessagePack over ordered maps) feed the memoization hash.
//! They cover world and room bindings and random streams. Facing is hashed
//! separately by the memo layer and recursion depth is never hashed.

use std::sync::Arc;

use im::{OrdMap, OrdSet};
use quire_foundation::{Error, ErrorKind, Facing, Item, Result, RoomId, SemanticLimit, Value};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// A set of named bindings.
pub type Bindings = OrdMap<Arc<str>, Value>;

// =============================================================================
// Room State
// =============================================================================

/// State that belongs to one room and persists across its visits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomState {
    /// Room-scoped bindings.
    pub vars: Bindings,
    /// Once-blocks that have fired in this room.
    pub once: OrdSet<u32>,
    /// Items lying in this room.
    pub items: OrdSet<Item>,
}

// =============================================================================
// Random Streams
// =============================================================================

/// A room's random stream, stored as its seed and position.
///
/// The generator itself is rebuilt on demand. Storing the position instead
/// of the generator keeps the state serializable and hashable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    /// Seed assigned when the state was created.
    pub seed: u64,
    /// Number of 32-bit words drawn so far.
    pub word_pos: u64,
}

impl RngState {
    /// A fresh stream for `seed`.
    #[must_use]
    pub const fn seeded(seed: u64) -> Self {
        Self { seed, word_pos: 0 }
    }

    /// Rebuilds the generator at the stored position.
    #[must_use]
    pub fn stream(self) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_word_pos(u128::from(self.word_pos));
        rng
    }

    /// Records how far `rng` has advanced.
    pub fn advance_to(&mut self, rng: &ChaCha8Rng) {
        self.word_pos = u64::try_from(rng.get_word_pos()).unwrap_or(u64::MAX);
    }
}

// =============================================================================
// Execution State
// =============================================================================

/// The mutable runtime state of one traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionState {
    world: Bindings,
    rooms: OrdMap<RoomId, RoomState>,
    rng: OrdMap<RoomId, RngState>,
    facing: Facing,
    depth: u32,
    limit: u32,
}

impl ExecutionState {
    /// Creates the state for a program with `room_count` rooms.
    ///
    /// Every room gets an empty [`RoomState`] and a random stream seeded from
    /// its arena index. Streams are never reseeded afterwards.
    #[must_use]
    pub fn new(room_count: usize, config: &EngineConfig) -> Self {
        let mut rooms = OrdMap::new();
        let mut rng = OrdMap::new();
        for index in 0..room_count {
            let id = room_id(index);
            rooms.insert(id, RoomState::default());
            rng.insert(id, RngState::seeded(config.room_seed(index)));
        }
        Self {
            world: OrdMap::new(),
            rooms,
            rng,
            facing: Facing::default(),
            depth: 0,
            limit: config.recursion_limit,
        }
    }

    /// Takes an immutable copy of the state.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            world: self.world.clone(),
            rooms: self.rooms.clone(),
            rng: self.rng.clone(),
            facing: self.facing,
            depth: self.depth,
        }
    }

    /// Overwrites the state with `snapshot`.
    pub fn restore(&mut self, snapshot: StateSnapshot) {
        self.world = snapshot.world;
        self.rooms = snapshot.rooms;
        self.rng = snapshot.rng;
        self.facing = snapshot.facing;
        self.depth = snapshot.depth;
    }

    /// Canonical bytes of the hashed part of the state.
    ///
    /// # Errors
    /// Returns a serialization error if encoding fails.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        encode(&Canonical {
            world: &self.world,
            rooms: &self.rooms,
            rng: &self.rng,
        })
    }

    // --- recursion ---

    /// Enters a room handler.
    ///
    /// # Errors
    /// Returns [`SemanticLimit::RecursionDepth`] if the ceiling is reached.
    /// The depth is left unchanged in that case.
    pub fn enter_room(&mut self, room: &str) -> Result<()> {
        if self.depth >= self.limit {
            return Err(Error::limit_exceeded(SemanticLimit::RecursionDepth {
                limit: self.limit,
                room: room.to_string(),
            }));
        }
        self.depth += 1;
        Ok(())
    }

    /// Leaves a room handler.
    pub fn exit_room(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Number of room handlers currently active.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// The recursion ceiling.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    // --- facing ---

    /// The reader's facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Turns the reader.
    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    // --- bindings ---

    /// Reads a world binding.
    #[must_use]
    pub fn world(&self, name: &str) -> Option<&Value> {
        self.world.get(name)
    }

    /// Writes a world binding.
    pub fn set_world(&mut self, name: Arc<str>, value: Value) {
        self.world.insert(name, value);
    }

    /// The state of `room`.
    #[must_use]
    pub fn room(&self, room: RoomId) -> Option<&RoomState> {
        self.rooms.get(&room)
    }

    /// Reads a room binding.
    #[must_use]
    pub fn room_var(&self, room: RoomId, name: &str) -> Option<&Value> {
        self.rooms.get(&room).and_then(|state| state.vars.get(name))
    }

    /// Writes a room binding.
    pub fn set_room_var(&mut self, room: RoomId, name: Arc<str>, value: Value) {
        self.room_mut(room).vars.insert(name, value);
    }

    /// Records that once-block `id` has fired in `room`.
    ///
    /// Returns `false` if it had already fired.
    pub fn mark_once(&mut self, room: RoomId, id: u32) -> bool {
        let state = self.room_mut(room);
        if state.once.contains(&id) {
            return false;
        }
        state.once.insert(id);
        true
    }

    /// Drops `item` into `room`.
    pub fn add_item(&mut self, room: RoomId, item: Item) {
        self.room_mut(room).items.insert(item);
    }

    fn room_mut(&mut self, room: RoomId) -> &mut RoomState {
        self.rooms.entry(room).or_insert_with(RoomState::default)
    }

    // --- randomness ---

    /// The random stream of `room`.
    ///
    /// # Errors
    /// Returns an internal error for a room outside the arena.
    pub fn rng_state(&self, room: RoomId) -> Result<RngState> {
        self.rng
            .get(&room)
            .copied()
            .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no random stream for {room}"))))
    }

    /// Replaces the random stream of `room`.
    pub fn set_rng_state(&mut self, room: RoomId, state: RngState) {
        self.rng.insert(room, state);
    }
}

/// Converts an arena index to a [`RoomId`].
pub(crate) fn room_id(index: usize) -> RoomId {
    RoomId(u32::try_from(index).unwrap_or(u32::MAX))
}

// =============================================================================
// Snapshots
// =============================================================================

/// An immutable copy of an [`ExecutionState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    world: Bindings,
    rooms: OrdMap<RoomId, RoomState>,
    rng: OrdMap<RoomId, RngState>,
    facing: Facing,
    depth: u32,
}

impl StateSnapshot {
    /// Canonical bytes of the hashed part of the snapshot. Equal to the
    /// bytes of the state it was taken from.
    ///
    /// # Errors
    /// Returns a serialization error if encoding fails.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        encode(&Canonical {
            world: &self.world,
            rooms: &self.rooms,
            rng: &self.rng,
        })
    }

    /// The facing at snapshot time.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// The recursion depth at snapshot time.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }
}

#[derive(Serialize)]
struct Canonical<'a> {
    world: &'a Bindings,
    rooms: &'a OrdMap<RoomId, RoomState>,
    rng: &'a OrdMap<RoomId, RngState>,
}

/// Encodes `value` as MessagePack.
pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec(value).map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}
