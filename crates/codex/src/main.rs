//! Codex CLI - static pages for the game codex.
//!
//! Provides commands for:
//! - `paths`: List the pre-rendered pages of a route
//! - `build`: Pre-render the listed pages to JSON documents
//! - `page`: Resolve a single page on demand

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, PageArgs, PathsArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Codex - static pages for the game codex.
#[derive(Parser)]
#[command(name = "codex", version, about)]
struct Cli {
    /// Enable verbose output (INFO level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the pages pre-rendered for the faction route.
    Paths(PathsArgs),
    /// Pre-render the listed pages.
    Build(BuildArgs),
    /// Resolve one page and print its document.
    Page(PageArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Paths(args) => args.execute(VERSION),
        Commands::Build(args) => args.execute(VERSION),
        Commands::Page(args) => args.execute(VERSION),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
