//! Integration tests for Layer 3: Engine
//!
//! Tests for the execution state, memoization, traversal and the rule
//! library as seen from scripts.

mod library;
mod memo;
mod state;
mod traversal;
