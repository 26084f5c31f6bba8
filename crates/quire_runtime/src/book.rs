//! The end-to-end build: source text in, pages out.

use std::path::Path;
use std::sync::Arc;

use quire_engine::{CompiledProgram, EngineConfig, NodeGraph, Traversal, TraversalStats, compile};
use quire_foundation::{Error, ErrorContext, ErrorKind, Result};
use quire_language::Metadata;

use crate::output::write_pages;
use crate::render::{Page, PageRenderer};

/// A fully expanded gamebook.
#[derive(Clone, Debug)]
pub struct Book {
    /// Header metadata from the source.
    pub metadata: Metadata,
    /// Every page reachable from the entry room.
    pub graph: NodeGraph,
    /// Traversal counters.
    pub stats: TraversalStats,
}

impl Book {
    /// Loads, compiles and expands `source`.
    ///
    /// # Errors
    /// Returns the first parse, compile or runtime error.
    pub fn build(source: &str, config: &EngineConfig) -> Result<Self> {
        let resolved = quire_language::load(source)?;
        let program: CompiledProgram = compile(&resolved)?;
        let metadata = program.metadata.clone();
        let entry = program.entry();

        let traversal = Traversal::new(Arc::new(program), *config);
        let (graph, stats) = traversal.run_from(entry)?;
        Ok(Self {
            metadata,
            graph,
            stats,
        })
    }

    /// Reads and builds the source file at `path`.
    ///
    /// Errors carry the path as their source.
    ///
    /// # Errors
    /// Returns an IO error if the file cannot be read, otherwise as [`Book::build`].
    pub fn build_file(path: impl AsRef<Path>, config: &EngineConfig) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::IoError(format!(
                "failed to read '{}': {e}",
                path.display()
            )))
        })?;
        tracing::info!(path = %path.display(), bytes = source.len(), "building");
        Self::build(&source, config).map_err(|e| with_source(e, path))
    }

    /// Renders every page.
    ///
    /// # Errors
    /// Returns the first rendering error.
    pub fn pages(&self, renderer: &impl PageRenderer) -> Result<Vec<Page>> {
        renderer.render_all(&self.graph, &self.metadata)
    }

    /// Renders every page and writes them to the renderer's output directory.
    /// Nothing is written if rendering fails.
    ///
    /// # Errors
    /// Returns the first rendering or IO error.
    pub fn publish(&self, renderer: &impl PageRenderer) -> Result<usize> {
        let pages = self.pages(renderer)?;
        write_pages(&pages, renderer.config())
    }
}

fn with_source(mut err: Error, path: &Path) -> Error {
    let context = err.context.take().unwrap_or_else(ErrorContext::new);
    let context = if context.source.is_some() {
        context
    } else {
        context.with_source(path.display().to_string())
    };
    err.context = Some(context);
    err
}
