//! Writing rendered pages to disk.

use std::fs;
use std::path::Path;

use quire_foundation::{Error, ErrorKind, Result};

use crate::config::RenderConfig;
use crate::render::Page;

/// Writes every page into the configured output directory, creating it if
/// needed. Existing files with the same names are overwritten; other files
/// are left alone.
///
/// Returns the number of pages written.
///
/// # Errors
///
/// Returns an error if the directory or any page cannot be written.
pub fn write_pages(pages: &[Page], config: &RenderConfig) -> Result<usize> {
    create_dir(&config.output_dir)?;
    for page in pages {
        let path = config.page_path(&page.name);
        fs::write(&path, &page.body).map_err(|e| {
            Error::new(ErrorKind::IoError(format!(
                "failed to write page '{}': {e}",
                path.display()
            )))
        })?;
        tracing::trace!(page = %page.name, "wrote page");
    }
    tracing::info!(
        pages = pages.len(),
        dir = %config.output_dir.display(),
        "pages written"
    );
    Ok(pages.len())
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to create directory '{}': {e}",
            dir.display()
        )))
    })
}
