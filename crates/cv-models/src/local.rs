//! Local placeholder providers.
//!
//! These stand in for a real embedding/inference model the way the
//! knowledge crate's `LocalEmbedder` always did before a model was wired
//! in: deterministic, hash-derived output so the rest of the pipeline
//! (retrieval, structuring, scoring) can be built and tested without a
//! model file on disk. `cv-cloud` implements the same traits against a
//! real API for production use.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::provider::{EmbeddingBatch, Llm, LlmResponse};
use crate::ModelResult;

/// Deterministic, SHA256-seeded embedding generator.
pub struct LocalEmbedder {
    model_name: String,
    dimensions: u32,
}

impl LocalEmbedder {
    pub fn new(dimensions: u32) -> Self {
        Self {
            model_name: "local-placeholder".to_string(),
            dimensions,
        }
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }
}

fn placeholder_embedding(text: &str, dimensions: u32) -> Vec<f32> {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = hasher.finalize();

    (0..dimensions)
        .map(|i| {
            let byte = hash[(i as usize) % hash.len()] as f32 / 255.0;
            (byte * 2.0) - 1.0
        })
        .collect()
}

#[async_trait]
impl crate::provider::Embedder for LocalEmbedder {
    async fn embed_texts(&self, texts: &[String]) -> ModelResult<EmbeddingBatch> {
        debug!("embedding {} texts locally", texts.len());
        let embeddings: Vec<Vec<f32>> = texts
            .iter()
            .map(|t| placeholder_embedding(t, self.dimensions))
            .collect();
        let tokens_used = texts.iter().map(|t| (t.len() / 4).max(1) as u32).sum();

        Ok(EmbeddingBatch {
            embeddings,
            tokens_used,
            latency_ms: 0,
        })
    }

    fn dimensions(&self) -> u32 {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Deterministic local LLM: echoes a templated, non-hallucinating answer
/// built from whatever the prompt asked. Good enough to exercise the
/// output-processor/structure layers without a real model; `cv-cloud`'s
/// OpenRouter client is what production wiring uses.
pub struct LocalLlm {
    model_id: String,
}

impl LocalLlm {
    pub fn new() -> Self {
        Self {
            model_id: "local-placeholder".to_string(),
        }
    }
}

impl Default for LocalLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Llm for LocalLlm {
    async fn generate(&self, prompt: &str, system_prompt: Option<&str>) -> ModelResult<LlmResponse> {
        debug!("generating locally for {} char prompt", prompt.len());
        let _ = system_prompt;
        let text = format!(
            ":::thinking\nReviewing the retrieved chunks for the question.\n:::\n\n\
             Based on the retrieved information, here is what the available CVs show.\n\n\
             :::conclusion\nSee the direct answer above for the supported claims.\n:::"
        );

        Ok(LlmResponse {
            prompt_tokens: (prompt.len() / 4).max(1) as u32,
            completion_tokens: (text.len() / 4).max(1) as u32,
            latency_ms: 0,
            text,
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Embedder;

    #[tokio::test]
    async fn embeddings_are_deterministic() {
        let embedder = LocalEmbedder::new(16);
        let a = embedder.embed_texts(&["hello".to_string()]).await.unwrap();
        let b = embedder.embed_texts(&["hello".to_string()]).await.unwrap();
        assert_eq!(a.embeddings, b.embeddings);
        assert_eq!(a.embeddings[0].len(), 16);
    }

    #[tokio::test]
    async fn local_llm_returns_structured_markers() {
        let llm = LocalLlm::new();
        let response = llm.generate("does Alice know Rust?", None).await.unwrap();
        assert!(response.text.contains(":::thinking"));
        assert!(response.text.contains(":::conclusion"));
    }
}
