//! Content-addressed node memoization.
//!
//! A [`ContentHash`] names everything that can influence a page: which room
//! or option produced it, the reader's facing, the canonical bytes of the
//! execution state and, for options, the locals they captured. Two paths
//! that reach the same hash share one node.

use std::collections::HashMap;
use std::fmt;

use quire_foundation::{Facing, NodeId, OptionId, Result, RoomId};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::state::{Bindings, encode};

/// What produced a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Origin {
    /// A room handler.
    Room(RoomId),
    /// An option handler.
    Option(OptionId),
}

/// SHA-256 over an origin, a facing and canonical state bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

#[derive(Serialize)]
struct Header<'a> {
    origin: Origin,
    facing: Facing,
    captured: Option<&'a Bindings>,
}

impl ContentHash {
    /// Hashes `state` (canonical state bytes) as seen from `origin`.
    ///
    /// # Errors
    /// Returns a serialization error if the captured bindings cannot be
    /// encoded.
    pub fn compute(
        origin: Origin,
        facing: Facing,
        state: &[u8],
        captured: Option<&Bindings>,
    ) -> Result<Self> {
        let header = encode(&Header {
            origin,
            facing,
            captured,
        })?;
        let mut hasher = Sha256::new();
        hasher.update(&header);
        hasher.update(state);
        Ok(Self(hasher.finalize().into()))
    }

    /// The raw digest.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex of the whole digest.
    #[must_use]
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        self.0.iter().fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// =============================================================================
// Node Index
// =============================================================================

/// The memoization table: content hash to node.
///
/// Append-only during a run.
#[derive(Debug, Default)]
pub struct NodeIndex {
    entries: HashMap<ContentHash, NodeId>,
    hits: u64,
    misses: u64,
}

impl NodeIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `hash`, counting the hit or miss.
    pub fn lookup(&mut self, hash: &ContentHash) -> Option<NodeId> {
        let found = self.entries.get(hash).copied();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// Looks up `hash` without touching the counters.
    #[must_use]
    pub fn get(&self, hash: &ContentHash) -> Option<NodeId> {
        self.entries.get(hash).copied()
    }

    /// Registers `node` for `hash`. An existing entry is kept.
    pub fn insert(&mut self, hash: ContentHash, node: NodeId) -> NodeId {
        *self.entries.entry(hash).or_insert(node)
    }

    /// Number of registered hashes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups that found a node.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that found nothing.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}
