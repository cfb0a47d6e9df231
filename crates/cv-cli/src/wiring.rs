//! Wires the providers for the active [`cv_types::Mode`] into a
//! [`cv_core::RagService`] (spec §9: "explicit dependencies constructed
//! once and passed down" rather than singletons).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cv_cloud::{OpenRouterEmbedder, OpenRouterLlm, SupabaseVectorStore};
use cv_core::{DefaultMode, RagService, RagServiceBuilder};
use cv_guardrail::Guardrail;
use cv_knowledge::SqliteVectorStore;
use cv_models::{Embedder, Llm, LocalEmbedder, LocalLlm, VectorStore};
use cv_types::Mode;

use crate::config::CliConfig;

/// Local placeholder embedding dimension (spec leaves the exact model
/// choice open; the local provider is a deterministic stand-in, see
/// `cv-models::local`).
const LOCAL_EMBEDDING_DIMENSIONS: u32 = 384;

/// Dimension of the default cloud embedding model
/// (`openai/text-embedding-3-small`, the smallest widely available
/// OpenRouter-proxied embedding model).
const CLOUD_EMBEDDING_DIMENSIONS: u32 = 1536;

pub fn build_service(cli_config: &CliConfig) -> anyhow::Result<RagService> {
    let mode = match cli_config.rag.default_mode {
        DefaultMode::Local => Mode::Local,
        DefaultMode::Cloud => Mode::Cloud,
    };

    let mut builder = RagServiceBuilder::new(cli_config.rag.clone(), mode)
        .guardrail(Guardrail::default())
        .eval_log_path(cli_config.eval_log_path().to_string_lossy().to_string());

    match mode {
        Mode::Local => {
            let embedder: Arc<dyn Embedder> = Arc::new(LocalEmbedder::new(LOCAL_EMBEDDING_DIMENSIONS));
            let store: Arc<dyn VectorStore> = Arc::new(
                SqliteVectorStore::open(&cli_config.vault_path(), LOCAL_EMBEDDING_DIMENSIONS)
                    .context("opening local knowledge vault")?,
            );
            let llm: Arc<dyn Llm> = Arc::new(LocalLlm::new());

            builder = builder
                .embedder(embedder)
                .store(store)
                .understanding_llm(llm.clone())
                .generation_llm(llm.clone())
                .verification_llm(llm);
        }
        Mode::Cloud => {
            let api_key = cli_config
                .rag
                .openrouter_api_key
                .clone()
                .context("cloud mode requires OPENROUTER_API_KEY")?;
            let supabase_url = cli_config
                .rag
                .supabase_url
                .clone()
                .context("cloud mode requires SUPABASE_URL")?;
            let supabase_key = cli_config
                .rag
                .supabase_service_key
                .clone()
                .context("cloud mode requires SUPABASE_SERVICE_KEY")?;

            let embedder: Arc<dyn Embedder> = Arc::new(OpenRouterEmbedder::new(
                api_key.clone(),
                "openai/text-embedding-3-small",
                CLOUD_EMBEDDING_DIMENSIONS,
                cli_config.rag.timeouts.embed,
            ));
            let store: Arc<dyn VectorStore> = Arc::new(SupabaseVectorStore::new(
                supabase_url,
                supabase_key,
                CLOUD_EMBEDDING_DIMENSIONS,
            ));
            let understanding_llm = Arc::new(OpenRouterLlm::new(
                api_key.clone(),
                cli_config.rag.understanding_model.clone(),
                cli_config.rag.timeouts.understanding,
            ));
            let rerank_llm = Arc::new(OpenRouterLlm::new(
                api_key.clone(),
                cli_config.rag.rerank_model.clone(),
                cli_config.rag.timeouts.rerank,
            ));
            let generation_llm = Arc::new(OpenRouterLlm::new(
                api_key.clone(),
                cli_config.rag.generation_model.clone(),
                cli_config.rag.timeouts.generation,
            ));
            let verification_llm = Arc::new(OpenRouterLlm::new(
                api_key,
                cli_config.rag.verification_model.clone(),
                cli_config.rag.timeouts.verification,
            ));

            builder = builder
                .embedder(embedder)
                .store(store)
                .understanding_llm(understanding_llm)
                .reranker(rerank_llm)
                .generation_llm(generation_llm)
                .verification_llm(verification_llm);
        }
    }

    builder.build().map_err(|e| anyhow::anyhow!("wiring RAG service: {e}"))
}

/// Used only to report a human-readable timeout in `status`.
pub fn describe_timeout(d: Duration) -> String {
    format!("{:.0}s", d.as_secs_f32())
}
