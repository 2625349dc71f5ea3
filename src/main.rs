//! # Pocket RAG CLI (`prag`)
//!
//! Ask questions about local documents. Every command builds a fresh
//! in-memory index from its `--doc` inputs; nothing is persisted.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `prag chunks <path>` | Show how a document would be chunked (no network) |
//! | `prag search "<question>" --doc <path>` | Print the top-k matching chunks |
//! | `prag ask "<question>" --doc <path>` | Answer a question from the documents |
//! | `prag chat --doc <path>` | Answer one question per stdin line |
//!
//! ## Examples
//!
//! ```bash
//! prag chunks ./notes/handbook.pdf
//! prag ask "What is the refund policy?" --doc ./notes/handbook.pdf
//! prag search "deployment" --doc ./docs --config ./config/pocket-rag.toml
//! echo "Who owns billing?" | prag chat --doc ./docs
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pocket_rag::{commands, config};

/// Pocket RAG: minimal in-memory retrieval-augmented generation.
///
/// Provider settings are read from a TOML file. See
/// `config/pocket-rag.example.toml` for every option.
#[derive(Parser)]
#[command(name = "prag", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/pocket-rag.toml`; built-in defaults are used if
    /// that file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overrides `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the chunks a document would produce.
    ///
    /// Chunks past `max_chunks_per_document` are marked as dropped.
    Chunks {
        /// Document to chunk (PDF or UTF-8 text).
        path: PathBuf,
    },

    /// Print the chunks most similar to a question, with scores.
    Search {
        question: String,

        /// Document or directory to ingest. Repeatable.
        #[arg(long = "doc", required = true)]
        docs: Vec<PathBuf>,
    },

    /// Answer a question using only the given documents.
    Ask {
        question: String,

        /// Document or directory to ingest. Repeatable.
        #[arg(long = "doc", required = true)]
        docs: Vec<PathBuf>,
    },

    /// Answer questions read from stdin, one per line, until EOF.
    Chat {
        /// Document or directory to ingest. Repeatable.
        #[arg(long = "doc", required = true)]
        docs: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    let cfg = config::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Chunks { path } => {
            commands::run_chunks(&cfg, &path)?;
        }
        Commands::Search { question, docs } => {
            commands::run_search(&cfg, &question, &docs).await?;
        }
        Commands::Ask { question, docs } => {
            commands::run_ask(&cfg, &question, &docs).await?;
        }
        Commands::Chat { docs } => {
            commands::run_chat(&cfg, &docs).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
