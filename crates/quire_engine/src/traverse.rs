//! The traversal driver.
//!
//! Starting at the entry room, the driver expands every reachable room and
//! option depth-first until no unresolved handler remains. The result is a
//! complete [`NodeGraph`]. A breach of the recursion ceiling aborts the whole
//! run; there is no partial output.
//!
//! Room handlers nest on the native stack, so every run happens on a worker
//! thread whose stack is sized from the configured ceiling.

use std::sync::Arc;
use std::thread;

use quire_foundation::{Error, ErrorKind, Result, RoomId};
use quire_language::ResolvedProgram;

use crate::compiler::{CompiledProgram, compile};
use crate::config::EngineConfig;
use crate::machine::{Machine, TraversalStats};
use crate::node::NodeGraph;

/// Drives one traversal of a compiled program.
#[derive(Debug, Clone)]
pub struct Traversal {
    program: Arc<CompiledProgram>,
    config: EngineConfig,
}

impl Traversal {
    /// Creates a driver for `program`.
    #[must_use]
    pub fn new(program: Arc<CompiledProgram>, config: EngineConfig) -> Self {
        Self { program, config }
    }

    /// The program being traversed.
    #[must_use]
    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }

    /// Expands everything reachable from the program's entry room.
    ///
    /// # Errors
    /// Returns the first runtime error, including ceiling breaches.
    pub fn run(&self) -> Result<NodeGraph> {
        self.run_from(self.program.entry()).map(|(graph, _)| graph)
    }

    /// Expands everything reachable from `entry` with a fresh state.
    ///
    /// # Errors
    /// Returns the first runtime error, including ceiling breaches.
    pub fn run_from(&self, entry: RoomId) -> Result<(NodeGraph, TraversalStats)> {
        let span = tracing::info_span!("traversal", entry = entry.0, seed = self.config.seed);
        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("traversal".to_string())
                .stack_size(self.config.stack_bytes())
                .spawn_scoped(scope, || span.in_scope(|| self.expand_from(entry)))
                .map_err(|e| {
                    Error::new(ErrorKind::Internal(format!(
                        "failed to start traversal thread: {e}"
                    )))
                })?;
            worker.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        })
    }

    fn expand_from(&self, entry: RoomId) -> Result<(NodeGraph, TraversalStats)> {
        let mut machine = Machine::new(Arc::clone(&self.program), &self.config);
        let root = machine.visit_room(entry, None)?;
        let stats = machine.stats();
        tracing::info!(
            nodes = stats.nodes,
            memo_hits = stats.memo_hits,
            memo_misses = stats.memo_misses,
            "traversal finished"
        );
        Ok((machine.into_graph(root)?, stats))
    }
}

/// Compiles and traverses a resolved program.
///
/// # Errors
/// Returns the first compile or runtime error.
pub fn expand(program: &ResolvedProgram, config: EngineConfig) -> Result<NodeGraph> {
    let compiled = compile(program)?;
    Traversal::new(Arc::new(compiled), config).run()
}

/// Loads, compiles and traverses gamebook source.
///
/// # Errors
/// Returns the first parse, compile or runtime error.
pub fn expand_source(source: &str, config: EngineConfig) -> Result<NodeGraph> {
    let program = quire_language::load(source)?;
    expand(&program, config)
}
