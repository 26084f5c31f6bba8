//! Page rendering.
//!
//! Rendering is a pure function of a finished [`NodeGraph`]: one page per
//! node plus an index page for the entry node. A node's page is its own text
//! and links, followed by the page of its continuation, so a `goto` reads as
//! one uninterrupted page.

use std::borrow::Cow;
use std::collections::HashSet;

use quire_engine::{Node, NodeGraph};
use quire_foundation::{Error, ErrorKind, NodeId, Result};
use quire_language::Metadata;

use crate::config::RenderConfig;

/// One rendered output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// File stem, without extension.
    pub name: String,
    /// Page contents.
    pub body: String,
}

/// Turns nodes into page bodies.
pub trait PageRenderer {
    /// The configuration used for file names and escaping.
    fn config(&self) -> &RenderConfig;

    /// Renders the page for `id`.
    ///
    /// # Errors
    /// Returns an error if the graph refers to a node it does not contain.
    fn render_node(&self, graph: &NodeGraph, id: NodeId) -> Result<String>;

    /// Renders the index page.
    ///
    /// # Errors
    /// Returns an error if the entry page cannot be rendered.
    fn render_index(&self, graph: &NodeGraph, metadata: &Metadata) -> Result<String>;

    /// Renders every node and the index, in node order with the index last.
    ///
    /// # Errors
    /// Returns the first rendering error.
    fn render_all(&self, graph: &NodeGraph, metadata: &Metadata) -> Result<Vec<Page>> {
        let mut pages = Vec::with_capacity(graph.len() + 1);
        for node in graph.nodes() {
            pages.push(Page {
                name: node.name.clone(),
                body: self.render_node(graph, node.id)?,
            });
        }
        pages.push(Page {
            name: self.config().index_name.clone(),
            body: self.render_index(graph, metadata)?,
        });
        Ok(pages)
    }
}

/// Markdown pages with `* [label](page.md)` link lists.
#[derive(Clone, Debug, Default)]
pub struct MarkdownRenderer {
    config: RenderConfig,
}

impl MarkdownRenderer {
    /// Creates a renderer.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.config.escape_html {
            escape_html(text)
        } else {
            Cow::Borrowed(text)
        }
    }

    fn links(&self, graph: &NodeGraph, node: &Node) -> Result<String> {
        let mut out = String::new();
        for choice in &node.children {
            let target = lookup(graph, choice.target)?;
            out.push_str("* [");
            out.push_str(&self.escape(&choice.label));
            out.push_str("](");
            out.push_str(&self.config.file_name(&target.name));
            out.push_str(")\n");
        }
        Ok(out)
    }
}

impl PageRenderer for MarkdownRenderer {
    fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn render_node(&self, graph: &NodeGraph, id: NodeId) -> Result<String> {
        let mut sections = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(id);

        while let Some(current) = next {
            if !seen.insert(current) {
                break;
            }
            let node = lookup(graph, current)?;
            if !node.text.is_empty() {
                sections.push(self.escape(&node.text).into_owned());
            }
            if !node.children.is_empty() {
                sections.push(self.links(graph, node)?.trim_end().to_string());
            }
            next = node.continuation;
        }

        let mut body = sections.join("\n\n");
        body.push('\n');
        Ok(body)
    }

    fn render_index(&self, graph: &NodeGraph, metadata: &Metadata) -> Result<String> {
        let mut header = Vec::new();
        if let Some(title) = &metadata.title {
            header.push(format!("# {}", self.escape(title)));
        }
        if let Some(subtitle) = &metadata.subtitle {
            header.push(format!("## {}", self.escape(subtitle)));
        }
        if let Some(author) = &metadata.author {
            header.push(format!("*by {}*", self.escape(author)));
        }

        let entry = self.render_node(graph, graph.entry())?;
        if header.is_empty() {
            return Ok(entry);
        }
        Ok(format!("{}\n\n{entry}", header.join("\n\n")))
    }
}

fn lookup(graph: &NodeGraph, id: NodeId) -> Result<&Node> {
    graph
        .get(id)
        .ok_or_else(|| Error::new(ErrorKind::Internal(format!("dangling node reference {id}"))))
}

/// Escapes `&`, `<`, `>`, `"` and `'`.
#[must_use]
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
