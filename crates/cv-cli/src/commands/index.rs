//! `cv index` — chunk, embed and store one or more CV text files (C2, C1).
//!
//! PDF extraction is an external collaborator (spec §1): this command
//! takes already-extracted UTF-8 text files (`.txt`/`.md`), the same way
//! the orchestrator's `index_documents` expects `raw_text` rather than
//! PDF bytes.

use std::path::PathBuf;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};

use cv_core::DocumentInput;

use crate::config::CliConfig;
use crate::display::{print_error, print_success};
use crate::wiring::build_service;

#[derive(Args)]
pub struct IndexArgs {
    /// CV text files to index
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub async fn run(args: IndexArgs, config: &CliConfig) -> anyhow::Result<()> {
    let service = build_service(config)?;

    let progress = ProgressBar::new(args.paths.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut documents = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        progress.set_message(path.display().to_string());
        let raw_text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                print_error(&format!("skipping {}: {e}", path.display()));
                progress.inc(1);
                continue;
            }
        };
        if raw_text.trim().is_empty() {
            print_error(&format!("skipping {}: empty text", path.display()));
            progress.inc(1);
            continue;
        }

        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let cv_id = derive_cv_id(&raw_text);

        documents.push(DocumentInput {
            cv_id,
            filename,
            raw_text,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    if documents.is_empty() {
        print_error("no valid CV text to index");
        return Ok(());
    }

    let indexed_count = documents.len();
    let chunk_count = service.index_documents(documents).await?;
    print_success(&format!(
        "indexed {indexed_count} CV(s) into {chunk_count} chunk(s)"
    ));
    Ok(())
}

/// Deterministic cv_id: same text (ingested twice) gets the same id,
/// matching the spec's "indexing the same CV twice yields identical
/// chunks and metadata" round-trip property (§8) down to the id itself.
fn derive_cv_id(raw_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_text.as_bytes());
    let digest = hasher.finalize();
    format!("cv_{}", hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cv_id_is_deterministic_for_identical_text() {
        assert_eq!(derive_cv_id("same text"), derive_cv_id("same text"));
    }

    #[test]
    fn cv_id_differs_for_different_text() {
        assert_ne!(derive_cv_id("text a"), derive_cv_id("text b"));
    }

    #[test]
    fn cv_id_carries_the_cv_prefix() {
        assert!(derive_cv_id("anything").starts_with("cv_"));
    }
}
