//! Native (Rust) functions callable from room scripts.
//!
//! The rule library is an environment the engine calls into, not state it
//! owns. A native function sees the engine only through [`Host`], which
//! exposes the current room's random stream and the reader's facing. Any
//! change made through `Host` is written back into the execution state,
//! so it is snapshotted and hashed like any other world mutation.

use std::fmt;

use rand::RngCore;

use crate::facing::Facing;
use crate::types::Arity;
use crate::value::Value;
use crate::{Error, Result};

/// The engine-side services a native function may use.
pub trait Host {
    /// The random stream of the room currently executing.
    fn rng(&mut self) -> &mut dyn RngCore;

    /// The reader's current facing.
    fn facing(&self) -> Facing;

    /// Turns the reader to face `facing`.
    fn set_facing(&mut self, facing: Facing);
}

/// Signature of a native function body.
pub type NativeFnPtr = fn(&[Value], &mut dyn Host) -> Result<Value>;

/// Native function callable from scripts.
#[derive(Clone, Copy)]
pub struct NativeFn {
    /// Function name as written in scripts.
    pub name: &'static str,
    /// Accepted argument counts.
    pub arity: Arity,
    /// Function pointer.
    pub func: NativeFnPtr,
}

impl NativeFn {
    /// Creates a new native function.
    #[must_use]
    pub const fn new(name: &'static str, arity: Arity, func: NativeFnPtr) -> Self {
        Self { name, arity, func }
    }

    /// Checks the argument count and invokes the function.
    ///
    /// # Errors
    /// Returns an arity mismatch, or whatever the function body returns.
    pub fn call(&self, args: &[Value], host: &mut dyn Host) -> Result<Value> {
        if !self.arity.accepts(args.len()) {
            return Err(Error::arity_mismatch(
                self.name,
                self.arity.to_string(),
                args.len(),
            ));
        }
        (self.func)(args, host)
    }
}

impl PartialEq for NativeFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::fn_addr_eq(self.func, other.func)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFn({})", self.name)
    }
}
