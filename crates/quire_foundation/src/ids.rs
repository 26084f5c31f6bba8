//! Arena identifiers for rooms, option handlers and output nodes.
//!
//! All three are dense indices assigned in a deterministic order:
//! rooms in declaration order, options in compile order, nodes in
//! allocation order during traversal.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index of a compiled room in the program's room arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoomId(pub u32);

impl RoomId {
    /// Returns the arena index of this room.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The slug used to name this room's nodes (`room_1` for the first room).
    #[must_use]
    pub fn slug(self) -> String {
        format!("room_{}", self.0 + 1)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Room({})", self.0)
    }
}

/// Index of a compiled option handler, unique across the whole program.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptionId(pub u32);

impl OptionId {
    /// Returns the arena index of this option.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The slug used to name this option's nodes.
    #[must_use]
    pub fn slug(self) -> String {
        format!("option_{:06}", self.0 + 1)
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Option({})", self.0)
    }
}

/// Identifier of a materialized output node (one page).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    /// Returns the arena index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}
