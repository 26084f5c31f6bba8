//! Closure compiler, execution state, memoization and traversal for Quire.
//!
//! This crate provides:
//! - [`compile`] - Lowering a resolved program into room and option closures
//! - [`ExecutionState`] - World, room and random-stream state with snapshots
//! - [`ContentHash`] and [`NodeIndex`] - Content-addressed node memoization
//! - [`Machine`] - Running handlers and materializing [`Node`]s
//! - [`Traversal`] - Expanding every reachable page into a [`NodeGraph`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compiler;
pub mod config;
pub mod machine;
pub mod memo;
pub mod node;
mod ops;
pub mod state;
pub mod traverse;

pub use compiler::{CompiledOption, CompiledProgram, CompiledRoom, compile, compile_with};
pub use config::{DEFAULT_RECURSION_LIMIT, EngineConfig};
pub use machine::{Flow, Frame, Machine, TraversalStats};
pub use memo::{ContentHash, NodeIndex, Origin};
pub use node::{Choice, Node, NodeGraph, NodeNamer};
pub use state::{Bindings, ExecutionState, RngState, RoomState, StateSnapshot};
pub use traverse::{Traversal, expand, expand_source};
