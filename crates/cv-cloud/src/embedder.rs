//! OpenRouter-backed [`cv_models::Embedder`] (C1, cloud mode).
//!
//! OpenRouter proxies a handful of dedicated embedding models (e.g.
//! `openai/text-embedding-3-small`) through the same bearer-token REST
//! shape as chat completions, just against `/embeddings` instead of
//! `/chat/completions`. Mirrors [`crate::llm::OpenRouterLlm`]'s
//! validate-then-send discipline.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cv_models::{EmbeddingBatch, ModelResult};

use crate::error::{CloudError, CloudResult};

const OPENROUTER_EMBEDDINGS_URL: &str = "https://openrouter.ai/api/v1/embeddings";
const MAX_BATCH_CHARS: usize = 500_000;

/// Embedding client for a single OpenRouter-hosted embedding model.
pub struct OpenRouterEmbedder {
    client: Client,
    api_key: String,
    model: String,
    dimensions: u32,
    timeout: Duration,
}

impl OpenRouterEmbedder {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            dimensions,
            timeout,
        }
    }

    fn validate(texts: &[String]) -> CloudResult<()> {
        if texts.is_empty() {
            return Err(CloudError::validation("no texts to embed"));
        }
        let total_chars: usize = texts.iter().map(|t| t.len()).sum();
        if total_chars > MAX_BATCH_CHARS {
            return Err(CloudError::validation(format!(
                "embedding batch too large (max {MAX_BATCH_CHARS} characters, got {total_chars})"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl cv_models::Embedder for OpenRouterEmbedder {
    async fn embed_texts(&self, texts: &[String]) -> ModelResult<EmbeddingBatch> {
        Self::validate(texts).map_err(cv_models::ModelError::from)?;

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let start = Instant::now();
        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(OPENROUTER_EMBEDDINGS_URL)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send(),
        )
        .await
        .map_err(|_| CloudError::Timeout(self.timeout))
        .map_err(cv_models::ModelError::from)?
        .map_err(CloudError::Http)
        .map_err(cv_models::ModelError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = if status.as_u16() == 401 || status.as_u16() == 403 {
                CloudError::auth(body)
            } else {
                CloudError::api(status.as_u16(), body)
            };
            return Err(err.into());
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(CloudError::Http)
            .map_err(cv_models::ModelError::from)?;
        let latency_ms = start.elapsed().as_millis() as u64;

        let mut embeddings: Vec<(usize, Vec<f32>)> = body
            .data
            .into_iter()
            .map(|d| (d.index, d.embedding))
            .collect();
        embeddings.sort_by_key(|(index, _)| *index);

        debug!(model = %self.model, count = embeddings.len(), latency_ms, "openrouter embedding batch");

        Ok(EmbeddingBatch {
            embeddings: embeddings.into_iter().map(|(_, e)| e).collect(),
            tokens_used: body.usage.map(|u| u.total_tokens).unwrap_or(0),
            latency_ms,
        })
    }

    fn dimensions(&self) -> u32 {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_batch() {
        assert!(OpenRouterEmbedder::validate(&[]).is_err());
    }

    #[test]
    fn rejects_oversized_batch() {
        let texts = vec!["x".repeat(MAX_BATCH_CHARS + 1)];
        assert!(OpenRouterEmbedder::validate(&texts).is_err());
    }

    #[test]
    fn accepts_ordinary_batch() {
        let texts = vec!["Experienced Rust engineer".to_string()];
        assert!(OpenRouterEmbedder::validate(&texts).is_ok());
    }

    #[test]
    fn reports_configured_dimensions_and_model() {
        use cv_models::Embedder;
        let embedder = OpenRouterEmbedder::new(
            "key",
            "openai/text-embedding-3-small",
            1536,
            Duration::from_secs(30),
        );
        assert_eq!(embedder.dimensions(), 1536);
        assert_eq!(embedder.model_name(), "openai/text-embedding-3-small");
    }
}
