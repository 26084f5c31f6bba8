//! Source to pages
//!
//! Tests the full build through the markdown renderer and page writer.

use std::collections::HashSet;

use quire::engine::EngineConfig;
use quire::runtime::{Book, MarkdownRenderer, PageRenderer, RenderConfig};

const MARKET: &str = r#"
    (meta Title "Market Day")
    (meta Author "A. Reader")
    (meta Library "rules")

    (macro leave (clear-options) (start-over))

    (room "Gate" "The market gate."
      (scope world coins)
      (set coins 3)
      (option "Enter" (goto "Square")))

    (room "Square" "Stalls everywhere. You have {coins} coins."
      (option "Buy bread" (set coins (- coins 1)) "You buy bread." (goto "Square"))
      (if (= coins 0) (expand leave)))
"#;

fn book() -> Book {
    Book::build(MARKET, &EngineConfig::new().with_recursion_limit(64))
        .unwrap_or_else(|e| panic!("build failed: {e}"))
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn spending_walks_the_coin_count_down() {
    let book = book();
    let texts: HashSet<_> = book.graph.nodes().map(|n| n.text.as_str()).collect();
    for coins in 0..=3 {
        let line = format!("Stalls everywhere. You have {coins} coins.");
        assert!(texts.contains(line.as_str()), "missing {line}");
    }
}

#[test]
fn macro_replaces_choices_once_broke() {
    let book = book();
    let renderer = MarkdownRenderer::default();
    let entry_name = book.graph.entry_node().unwrap().name.clone();

    let broke = book
        .graph
        .nodes()
        .find(|n| n.text.ends_with("You have 0 coins."))
        .unwrap();
    let page = renderer.render_node(&book.graph, broke.id).unwrap();
    assert!(!page.contains("Buy bread"));
    assert!(page.contains(&format!("* [Start over]({entry_name}.md)")));
}

#[test]
fn bought_bread_reads_through_to_the_square() {
    let book = book();
    let renderer = MarkdownRenderer::default();
    let bought = book
        .graph
        .nodes()
        .find(|n| n.text == "You buy bread.")
        .unwrap();
    let page = renderer.render_node(&book.graph, bought.id).unwrap();
    assert!(page.starts_with("You buy bread.\n\nStalls everywhere. You have "));
}

#[test]
fn index_opens_with_the_title_block() {
    let book = book();
    let pages = book.pages(&MarkdownRenderer::default()).unwrap();
    let index = pages.last().unwrap();
    assert_eq!(index.name, "index");
    assert!(index.body.starts_with("# Market Day\n\n*by A. Reader*\n\nThe market gate."));
}

#[test]
fn every_link_points_at_a_page() {
    let book = book();
    let pages = book.pages(&MarkdownRenderer::default()).unwrap();
    let names: HashSet<_> = pages.iter().map(|p| format!("{}.md", p.name)).collect();

    for page in &pages {
        for line in page.body.lines().filter(|l| l.starts_with("* [")) {
            let target = line
                .rsplit_once("](")
                .and_then(|(_, rest)| rest.strip_suffix(')'))
                .unwrap();
            assert!(names.contains(target), "{} links to missing {target}", page.name);
        }
    }
}

// =============================================================================
// Publishing
// =============================================================================

#[test]
fn publish_writes_one_file_per_page() {
    let dir = std::env::temp_dir().join(format!("quire_it_publish_{}", std::process::id()));
    let renderer = MarkdownRenderer::new(
        RenderConfig::new()
            .with_output_dir(&dir)
            .with_index_name("start")
            .with_extension("markdown"),
    );
    let book = book();

    let written = book.publish(&renderer).unwrap();
    assert_eq!(written, book.graph.len() + 1);
    assert!(dir.join("start.markdown").exists());
    let count = std::fs::read_dir(&dir).unwrap().count();
    assert_eq!(count, written);

    let index = std::fs::read_to_string(dir.join("start.markdown")).unwrap();
    assert!(index.contains(".markdown)"));

    let _ = std::fs::remove_dir_all(&dir);
}
