//! Quire CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use quire_engine::{DEFAULT_RECURSION_LIMIT, EngineConfig};
use quire_foundation::{Error, Result};
use quire_runtime::serialize::save_to_file;
use quire_runtime::{Book, MarkdownRenderer, RenderConfig, init_tracing};

/// Expand a gamebook script into a directory of linked pages.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about)]
struct Args {
    /// Gamebook source file.
    source: PathBuf,

    /// Directory that receives the pages.
    #[arg(short, long, default_value = "md")]
    output: PathBuf,

    /// Seed for every room's dice stream.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Maximum room nesting before the build is aborted.
    #[arg(long, default_value_t = DEFAULT_RECURSION_LIMIT)]
    recursion_limit: u32,

    /// Name of the index page, without extension.
    #[arg(long, default_value = "index")]
    index_name: String,

    /// Write text and labels without HTML escaping.
    #[arg(long)]
    no_escape: bool,

    /// Also write the node graph as `MessagePack` to this path.
    #[arg(long, value_name = "PATH")]
    export_graph: Option<PathBuf>,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.debug) {
        eprintln!("warning: {e}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let engine = EngineConfig::new()
        .with_seed(args.seed)
        .with_recursion_limit(args.recursion_limit);
    let render = RenderConfig::new()
        .with_output_dir(&args.output)
        .with_index_name(&args.index_name)
        .with_escape_html(!args.no_escape);

    let book = Book::build_file(&args.source, &engine)?;
    let written = book.publish(&MarkdownRenderer::new(render))?;

    if let Some(path) = &args.export_graph {
        save_to_file(&book.graph, path)?;
    }

    println!(
        "{} pages written to {} ({} memo hits)",
        written,
        args.output.display(),
        book.stats.memo_hits
    );
    Ok(())
}

fn report(error: &Error) {
    eprintln!("\x1b[31merror: {error}\x1b[0m");
    if let Some(context) = &error.context {
        let rendered = context.to_string();
        if !rendered.is_empty() {
            eprintln!("{}", rendered.trim_end());
        }
    }
}
