//! Cross-layer integration tests for Quire
//!
//! Tests that take a script from source text through traversal to rendered
//! pages and exported graphs.

mod errors;
mod export;
mod pipeline;
