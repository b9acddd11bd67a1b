//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

const QUICK_START: &str = "\
Quick Start:
  $ lexrag init                              # Create .lexrag/settings.toml
  $ lexrag index                             # Build the vector index
  $ lexrag search \"Bodenmaterial Klasse 0\"   # Show the closest chunks
  $ lexrag ask                               # Interactive question loop";

/// Question answering over German environmental regulations
#[derive(Parser, Debug)]
#[command(
    name = "lexrag",
    version = env!("CARGO_PKG_VERSION"),
    about = "Retrieval-augmented answers from regulatory texts",
    long_about = "Index a regulatory document and answer questions with retrieved paragraphs as context.",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = QUICK_START
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .lexrag directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    #[command(about = "Display active settings")]
    Config,

    /// Build the vector index from the source document
    #[command(about = "Chunk, embed and persist the source document")]
    Index {
        /// Source document (overrides [document] path)
        #[arg(short, long, value_name = "PATH")]
        document: Option<PathBuf>,

        /// Rebuild even if an index already exists
        #[arg(short, long)]
        force: bool,

        /// Load and chunk only; nothing is embedded or written
        #[arg(long)]
        dry_run: bool,
    },

    /// Retrieve the closest chunks without generating an answer
    #[command(about = "Show the chunks most similar to a query")]
    Search {
        /// Query text
        query: String,

        /// Number of chunks to show (overrides [retrieval] top_k)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer a question, or start the interactive loop when none is given
    #[command(about = "Ask questions about the indexed document")]
    Ask {
        /// Question to answer once
        question: Option<String>,
    },
}
