//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, dice expressions, Facing, Item and Error.

mod dice;
mod errors;
mod facing;
mod values;
