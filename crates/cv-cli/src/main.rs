//! CV RAG Engine — Command Line Interface
//!
//! The main entry point for the `cv` command: a thin driver over the
//! library crates (`cv-core`'s [`cv_core::RagService`] and friends) that
//! wires a mode's providers together, indexes CV text and runs queries
//! against the indexed session.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;
mod display;
mod wiring;

/// CV RAG Engine — retrieval-augmented question answering over résumés.
#[derive(Parser)]
#[command(name = "cv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Data directory (vector store, eval log, sessions). Defaults to
    /// `$CV_DATA_DIR` or `~/.cv-rag`.
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index one or more CV text files into the knowledge vault
    Index(commands::index::IndexArgs),

    /// Ask a question against the indexed CVs (main interaction, C16)
    Ask(commands::ask::AskArgs),

    /// Show vector store stats and the active mode
    Status(commands::status::StatusArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(commands::config::ConfigCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt().with_env_filter(filter).with_target(false).init();

    let config = config::CliConfig::load(cli.data_dir.as_deref())?;

    match cli.command {
        Commands::Index(args) => commands::index::run(args, &config).await,
        Commands::Ask(args) => commands::ask::run(args, &config).await,
        Commands::Status(args) => commands::status::run(args, &config).await,
        Commands::Config(cmd) => commands::config::run(cmd, &config).await,
    }
}
