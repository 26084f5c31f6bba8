//! Output nodes: one materialized page per distinct (origin, state).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use quire_foundation::{NodeId, RoomId};
use serde::{Deserialize, Serialize};

/// A labelled link from one node to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Link text.
    pub label: String,
    /// Destination node.
    pub target: NodeId,
}

impl Choice {
    /// Creates a choice.
    #[must_use]
    pub fn new(label: impl Into<String>, target: NodeId) -> Self {
        Self {
            label: label.into(),
            target,
        }
    }
}

/// A finished page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node identity.
    pub id: NodeId,
    /// Stable page name, such as `room_1-000`.
    pub name: String,
    /// The room that produced the node (the enclosing room for options).
    pub room: RoomId,
    /// Text emitted by the handler, segments separated by blank lines.
    pub text: String,
    /// Choices, sorted by label.
    pub children: Vec<Choice>,
    /// Node whose page continues this one inline, set by `goto` and by
    /// options that fall through to their room.
    pub continuation: Option<NodeId>,
}

impl Node {
    /// True if the node has no text and no choices of its own.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.children.is_empty()
    }
}

// =============================================================================
// Node Graph
// =============================================================================

/// The complete output of a traversal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGraph {
    entry: NodeId,
    nodes: BTreeMap<NodeId, Node>,
}

impl NodeGraph {
    /// Creates a graph rooted at `entry`.
    #[must_use]
    pub const fn new(entry: NodeId, nodes: BTreeMap<NodeId, Node>) -> Self {
        Self { entry, nodes }
    }

    /// The entry node id.
    #[must_use]
    pub const fn entry(&self) -> NodeId {
        self.entry
    }

    /// The entry node.
    #[must_use]
    pub fn entry_node(&self) -> Option<&Node> {
        self.nodes.get(&self.entry)
    }

    /// Looks up a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Finds a node by page name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.values().find(|node| node.name == name)
    }

    /// Every node, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Nodes produced by `room`.
    pub fn room_nodes(&self, room: RoomId) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |node| node.room == room)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Text of `id` followed by the text of its continuation chain, as it
    /// reads on the page.
    #[must_use]
    pub fn inline_text(&self, id: NodeId) -> String {
        let mut seen = BTreeSet::new();
        let mut parts = Vec::new();
        let mut next = Some(id);
        while let Some(id) = next {
            if !seen.insert(id) {
                break;
            }
            let Some(node) = self.nodes.get(&id) else {
                break;
            };
            if !node.text.is_empty() {
                parts.push(node.text.as_str());
            }
            next = node.continuation;
        }
        parts.join("\n\n")
    }

    /// Ids of nodes nothing links to or continues into, apart from the entry.
    #[must_use]
    pub fn orphans(&self) -> Vec<NodeId> {
        let mut referenced: BTreeSet<NodeId> = BTreeSet::new();
        referenced.insert(self.entry);
        for node in self.nodes.values() {
            referenced.extend(node.children.iter().map(|c| c.target));
            referenced.extend(node.continuation);
        }
        self.nodes
            .keys()
            .filter(|id| !referenced.contains(id))
            .copied()
            .collect()
    }
}

// =============================================================================
// Naming
// =============================================================================

/// Hands out page names with a counter per prefix.
#[derive(Debug, Default)]
pub struct NodeNamer {
    counters: HashMap<String, u32>,
}

impl NodeNamer {
    /// Creates a namer with every counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The next name for `prefix`: `prefix-000`, `prefix-001`, ...
    pub fn next(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        let name = format!("{prefix}-{counter:03x}");
        *counter += 1;
        name
    }
}
