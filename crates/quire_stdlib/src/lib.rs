//! The rule library callable from gamebook scripts.
//!
//! Functions are organized into libraries:
//! - `core`: strings, collections, items and facing (always available)
//! - `rules`: dice rolls, attacks and difficulty checks
//!
//! A script imports extra libraries with `(meta Library "name")`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod base;
pub mod env;
pub mod rules;

#[cfg(test)]
mod testing;

pub use env::{Environment, LIBRARIES, Library, library};
