//! Core types shared by every Quire layer.
//!
//! This crate provides:
//! - [`Value`] - The value type scripts compute with
//! - [`DiceExpr`] - Dice notation parsing and rolling
//! - [`Facing`] and [`Item`] - The gamebook's world vocabulary
//! - [`RoomId`], [`OptionId`], [`NodeId`] - Arena identifiers
//! - [`NativeFn`] and [`Host`] - The rule-library calling convention
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod dice;
pub mod error;
pub mod facing;
pub mod ids;
pub mod item;
pub mod native;
pub mod types;
pub mod value;

pub use dice::{DiceExpr, DiceRoll, DiceTerm};
pub use error::{Error, ErrorContext, ErrorKind, SemanticLimit};
pub use facing::Facing;
pub use ids::{NodeId, OptionId, RoomId};
pub use item::{Item, inventory_line};
pub use native::{Host, NativeFn, NativeFnPtr};
pub use types::{Arity, Type};
pub use value::Value;

/// Result type alias using the Quire error type.
pub type Result<T> = std::result::Result<T, Error>;
