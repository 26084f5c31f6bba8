//! The function environment a script compiles against.

use std::collections::BTreeMap;

use quire_foundation::{Error, ErrorKind, NativeFn, Result};

use crate::{base, rules};

/// A named group of native functions.
#[derive(Clone, Copy, Debug)]
pub struct Library {
    /// Name used in `(meta Library "name")`.
    pub name: &'static str,
    /// The functions it provides.
    pub functions: &'static [NativeFn],
}

/// Every library known to the engine.
pub static LIBRARIES: &[Library] = &[
    Library {
        name: "core",
        functions: base::FUNCTIONS,
    },
    Library {
        name: "rules",
        functions: rules::FUNCTIONS,
    },
];

/// Looks up a library by name.
#[must_use]
pub fn library(name: &str) -> Option<&'static Library> {
    LIBRARIES.iter().find(|lib| lib.name == name)
}

/// The functions visible to a program: `core` plus its imports.
///
/// Library bindings are environment, not state. They are resolved when a
/// program is compiled and never snapshotted.
#[derive(Clone, Debug)]
pub struct Environment {
    functions: BTreeMap<&'static str, NativeFn>,
    imported: Vec<&'static str>,
}

impl Environment {
    /// Creates an environment with only the `core` library.
    #[must_use]
    pub fn new() -> Self {
        let mut env = Self {
            functions: BTreeMap::new(),
            imported: Vec::new(),
        };
        env.add(&LIBRARIES[0]);
        env
    }

    /// Creates an environment importing each named library.
    ///
    /// # Errors
    /// Returns [`ErrorKind::UnknownLibrary`] for a name no library has.
    pub fn with_libraries<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut env = Self::new();
        for name in names {
            env.import(name.as_ref())?;
        }
        Ok(env)
    }

    /// Imports a library. Importing one twice is harmless.
    ///
    /// # Errors
    /// Returns [`ErrorKind::UnknownLibrary`] for a name no library has.
    pub fn import(&mut self, name: &str) -> Result<()> {
        let lib = library(name.trim())
            .ok_or_else(|| Error::new(ErrorKind::UnknownLibrary(name.to_string())))?;
        self.add(lib);
        Ok(())
    }

    fn add(&mut self, lib: &'static Library) {
        if self.imported.contains(&lib.name) {
            return;
        }
        for f in lib.functions {
            self.functions.insert(f.name, *f);
        }
        self.imported.push(lib.name);
        tracing::debug!(library = lib.name, functions = lib.functions.len(), "imported library");
    }

    /// Finds a function by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NativeFn> {
        self.functions.get(name).copied()
    }

    /// Finds a function by name or fails.
    ///
    /// # Errors
    /// Returns [`ErrorKind::UnknownFunction`] if no imported library has it.
    pub fn resolve(&self, name: &str) -> Result<NativeFn> {
        self.lookup(name)
            .ok_or_else(|| Error::new(ErrorKind::UnknownFunction(name.to_string())))
    }

    /// Names of the imported libraries, in import order.
    #[must_use]
    pub fn libraries(&self) -> &[&'static str] {
        &self.imported
    }

    /// Names of every visible function, sorted.
    pub fn function_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
