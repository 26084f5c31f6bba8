//! Compile-time macro table.
//!
//! Macros are statement lists inlined at each `(expand name)`. The table is
//! global to a program and filled in source order, so a macro must be
//! defined before its first expansion.

use std::collections::HashMap;

use quire_foundation::{Error, ErrorKind, Result};

use crate::syntax::{MacroDef, Stmt};

/// Registered macros plus the stack of expansions in progress.
#[derive(Debug, Default)]
pub struct MacroTable {
    macros: HashMap<String, MacroDef>,
    expanding: Vec<String>,
}

impl MacroTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a macro.
    ///
    /// # Errors
    /// Returns [`ErrorKind::DuplicateMacro`] if the name is taken.
    pub fn define(&mut self, def: MacroDef) -> Result<()> {
        if self.macros.contains_key(&def.name) {
            return Err(Error::duplicate_macro(def.name));
        }
        tracing::trace!(name = %def.name, "macro defined");
        self.macros.insert(def.name.clone(), def);
        Ok(())
    }

    /// Starts expanding `name`, returning a copy of its body.
    ///
    /// Every successful call must be paired with [`MacroTable::end_expansion`].
    ///
    /// # Errors
    /// Returns [`ErrorKind::UndefinedMacro`] for an unknown name, or
    /// [`ErrorKind::RecursiveMacro`] if `name` is already being expanded.
    pub fn begin_expansion(&mut self, name: &str) -> Result<Vec<Stmt>> {
        let def = self
            .macros
            .get(name)
            .ok_or_else(|| Error::new(ErrorKind::UndefinedMacro(name.to_string())))?;
        if self.expanding.iter().any(|n| n == name) {
            return Err(Error::new(ErrorKind::RecursiveMacro(name.to_string())));
        }
        self.expanding.push(name.to_string());
        Ok(def.body.clone())
    }

    /// Finishes the innermost expansion.
    pub fn end_expansion(&mut self) {
        self.expanding.pop();
    }

    /// Returns true if a macro with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Number of macros defined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// Returns true if no macros are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}
