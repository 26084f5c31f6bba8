//! Output configuration.

use std::path::{Path, PathBuf};

/// Settings for rendering and writing pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Directory that receives the pages.
    pub output_dir: PathBuf,
    /// File stem of the index page.
    pub index_name: String,
    /// Page file extension, without the dot. Links use it too.
    pub extension: String,
    /// Whether text and labels are HTML-escaped.
    pub escape_html: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("md"),
            index_name: "index".to_string(),
            extension: "md".to_string(),
            escape_html: true,
        }
    }
}

impl RenderConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the index page stem.
    #[must_use]
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Sets the page extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Turns HTML escaping on or off.
    #[must_use]
    pub fn with_escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }

    /// File name for a page stem, such as `room_1-000.md`.
    #[must_use]
    pub fn file_name(&self, stem: &str) -> String {
        if self.extension.is_empty() {
            stem.to_string()
        } else {
            format!("{stem}.{}", self.extension)
        }
    }

    /// Full path of a page inside the output directory.
    #[must_use]
    pub fn page_path(&self, stem: &str) -> PathBuf {
        Path::new(&self.output_dir).join(self.file_name(stem))
    }
}
