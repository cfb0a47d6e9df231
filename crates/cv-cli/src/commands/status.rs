//! `cv status` — vector store stats and the active mode.

use clap::Args;
use comfy_table::{presets::UTF8_FULL, Table};
use owo_colors::OwoColorize;

use cv_types::Mode;

use crate::config::CliConfig;
use crate::wiring::{build_service, describe_timeout};

#[derive(Args)]
pub struct StatusArgs {}

pub async fn run(_args: StatusArgs, config: &CliConfig) -> anyhow::Result<()> {
    let service = build_service(config)?;
    let stats = service.store_stats().await?;

    println!("{}", "CV RAG Engine Status".bold());
    println!("{}", "─".repeat(40).dimmed());

    let mode_label = match service.mode() {
        Mode::Local => "Local".green().to_string(),
        Mode::Cloud => "Cloud".cyan().to_string(),
    };
    println!("  {} {}", "Mode:".dimmed(), mode_label);
    println!("  {} {}", "Data dir:".dimmed(), config.data_dir.display());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Indexed CVs".to_string(), stats.cv_count.to_string()]);
    table.add_row(vec!["Indexed chunks".to_string(), stats.chunk_count.to_string()]);
    table.add_row(vec![
        "Embedding dimensions".to_string(),
        stats.embedding_dimensions.to_string(),
    ]);
    println!("{table}");

    println!(
        "  {} k={} threshold={:.2}",
        "Retrieval defaults:".dimmed(),
        config.rag.retrieval_k,
        config.rag.retrieval_score_threshold
    );
    println!(
        "  {} understanding {} · embed {} · search {} · rerank {} · generation {} · verification {}",
        "Stage timeouts:".dimmed(),
        describe_timeout(config.rag.timeouts.understanding),
        describe_timeout(config.rag.timeouts.embed),
        describe_timeout(config.rag.timeouts.search),
        describe_timeout(config.rag.timeouts.rerank),
        describe_timeout(config.rag.timeouts.generation),
        describe_timeout(config.rag.timeouts.verification),
    );

    Ok(())
}
