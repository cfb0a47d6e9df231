//! `cv config` — inspect the active configuration or scaffold a `.env`.

use clap::Subcommand;
use owo_colors::OwoColorize;

use cv_core::DefaultMode;

use crate::config::CliConfig;
use crate::display::{print_error, print_success};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the resolved configuration (env vars + data dir)
    Show,

    /// Write a `.env` template with the spec's env vars (§6) to the
    /// current directory
    Init {
        /// Overwrite an existing `.env` file
        #[arg(long)]
        force: bool,
    },
}

const ENV_TEMPLATE: &str = "\
# CV RAG Engine configuration (spec §6)
DEFAULT_MODE=local

# Cloud mode (required when DEFAULT_MODE=cloud)
OPENROUTER_API_KEY=
SUPABASE_URL=
SUPABASE_SERVICE_KEY=

# Retrieval
RETRIEVAL_K=8
RETRIEVAL_SCORE_THRESHOLD=0.25

# Model ids (cloud mode)
UNDERSTANDING_MODEL=local-classifier
RERANK_MODEL=local-reranker
GENERATION_MODEL=local-generator
VERIFICATION_MODEL=local-verifier
";

pub async fn run(cmd: ConfigCommands, config: &CliConfig) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => show(config),
        ConfigCommands::Init { force } => init(force),
    }
    Ok(())
}

fn show(config: &CliConfig) {
    println!("{}", "Configuration".bold());
    println!("{}", "─".repeat(40).dimmed());
    let mode_label = match config.rag.default_mode {
        DefaultMode::Local => "local",
        DefaultMode::Cloud => "cloud",
    };
    println!("  {} {}", "Mode:".dimmed(), mode_label);
    println!("  {} {}", "Data dir:".dimmed(), config.data_dir.display());
    println!("  {} {}", "Retrieval k:".dimmed(), config.rag.retrieval_k);
    println!(
        "  {} {:.2}",
        "Retrieval threshold:".dimmed(),
        config.rag.retrieval_score_threshold
    );
    println!("  {} {}", "Understanding model:".dimmed(), config.rag.understanding_model);
    println!("  {} {}", "Rerank model:".dimmed(), config.rag.rerank_model);
    println!("  {} {}", "Generation model:".dimmed(), config.rag.generation_model);
    println!("  {} {}", "Verification model:".dimmed(), config.rag.verification_model);
}

fn init(force: bool) {
    let path = std::path::Path::new(".env");
    if path.exists() && !force {
        print_error(".env already exists (use --force to overwrite)");
        return;
    }
    if let Err(e) = std::fs::write(path, ENV_TEMPLATE) {
        print_error(&format!("writing .env: {e}"));
        return;
    }
    print_success("wrote .env template");
}
