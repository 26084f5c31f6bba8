//! Rendering, export and the command line for Quire.
//!
//! This crate provides:
//! - [`Book`] - Building a gamebook from source to a node graph
//! - [`PageRenderer`] and [`MarkdownRenderer`] - Turning nodes into pages
//! - [`write_pages`] - Writing pages to an output directory
//! - Node graph export with `MessagePack`
//! - [`init_tracing`] - Log setup for the `quire` binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod book;
pub mod config;
pub mod logging;
pub mod output;
pub mod render;
pub mod serialize;

pub use book::Book;
pub use config::RenderConfig;
pub use logging::init_tracing;
pub use output::write_pages;
pub use render::{MarkdownRenderer, Page, PageRenderer, escape_html};
