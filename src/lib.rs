//! Quire - Gamebook compiler and page-graph expander
//!
//! This crate re-exports all layers of the Quire system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: quire_runtime    - Renderer, page output, graph export, CLI
//! Layer 3: quire_engine     - Closure compiler, state store, memoization, traversal
//! Layer 2: quire_stdlib     - Rule library callable from scripts
//! Layer 1: quire_language   - Lexer, parser, parse tree, scope resolver, macros
//! Layer 0: quire_foundation - Core types (Value, Facing, Item, Error)
//! ```

pub use quire_engine as engine;
pub use quire_foundation as foundation;
pub use quire_language as language;
pub use quire_runtime as runtime;
pub use quire_stdlib as stdlib;
