//! Scope classification for identifiers.
//!
//! Rooms are resolved in source order. World declarations accumulate across
//! the whole program; room declarations and locals are reset at the start of
//! every room.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::syntax::{DeclScope, ScopeKind};

/// The set of locals live at a block boundary.
#[derive(Clone, Debug)]
pub struct BlockMark(BTreeSet<Arc<str>>);

/// Classifies identifiers as World, Room or Local.
#[derive(Clone, Debug, Default)]
pub struct ScopeResolver {
    world: BTreeSet<Arc<str>>,
    room: BTreeSet<Arc<str>>,
    locals: BTreeSet<Arc<str>>,
}

impl ScopeResolver {
    /// Creates a resolver with no declarations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new room: forgets room declarations and locals.
    pub fn begin_room(&mut self) {
        self.room.clear();
        self.locals.clear();
    }

    /// Records a `(scope world|room name)` declaration.
    pub fn declare(&mut self, scope: DeclScope, name: &Arc<str>) {
        match scope {
            DeclScope::World => self.world.insert(Arc::clone(name)),
            DeclScope::Room => self.room.insert(Arc::clone(name)),
        };
    }

    /// Classifies `name`, registering it as a local on first sight.
    pub fn resolve(&mut self, name: &Arc<str>) -> ScopeKind {
        if let Some(kind) = self.lookup(name) {
            return kind;
        }
        self.locals.insert(Arc::clone(name));
        ScopeKind::Local
    }

    /// Classifies `name` without registering anything.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ScopeKind> {
        if self.world.contains(name) {
            Some(ScopeKind::World)
        } else if self.room.contains(name) {
            Some(ScopeKind::Room)
        } else if self.locals.contains(name) {
            Some(ScopeKind::Local)
        } else {
            None
        }
    }

    /// Marks the start of a nested block.
    #[must_use]
    pub fn enter_block(&self) -> BlockMark {
        BlockMark(self.locals.clone())
    }

    /// Ends a nested block, returning the locals it introduced in name order.
    ///
    /// Those locals are forgotten, so a later use of the same name registers
    /// a fresh local.
    pub fn exit_block(&mut self, mark: BlockMark) -> Vec<Arc<str>> {
        let introduced = self.locals.difference(&mark.0).cloned().collect();
        self.locals = mark.0;
        introduced
    }

    /// The locals currently live, in name order.
    #[must_use]
    pub fn live_locals(&self) -> Vec<Arc<str>> {
        self.locals.iter().cloned().collect()
    }
}
