//! Provider Interfaces (C1)
//!
//! `Embedder`, `VectorStore`, `Llm` and `Reranker` are the four seams
//! through which `cv-core` reaches either the local implementations in
//! `cv-knowledge`/this crate or the cloud implementations in `cv-cloud`.
//! Mirrors the shape of `EmbeddingProvider` from the knowledge crate,
//! generalized to the other three provider kinds the pipeline needs.

use async_trait::async_trait;
use cv_types::SearchResult;

use crate::ModelResult;

/// Output of an embedding call: one vector per input text.
#[derive(Debug, Clone)]
pub struct EmbeddingBatch {
    pub embeddings: Vec<Vec<f32>>,
    pub tokens_used: u32,
    pub latency_ms: u64,
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_texts(&self, texts: &[String]) -> ModelResult<EmbeddingBatch>;

    /// Convenience wrapper for a single query string.
    async fn embed_query(&self, text: &str) -> ModelResult<EmbeddingBatch> {
        self.embed_texts(std::slice::from_ref(&text.to_string()))
            .await
    }

    fn dimensions(&self) -> u32;
    fn model_name(&self) -> &str;
}

/// A document ready for the vector store: a chunk plus its embedding.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: cv_types::Chunk,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VectorStoreStats {
    pub cv_count: u64,
    pub chunk_count: u64,
    pub embedding_dimensions: u32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn add_documents(&self, documents: Vec<EmbeddedChunk>) -> ModelResult<()>;

    async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        threshold: f32,
        cv_ids: Option<&[String]>,
        diversify_by_cv: bool,
    ) -> ModelResult<Vec<SearchResult>>;

    async fn get_stats(&self) -> ModelResult<VectorStoreStats>;

    async fn delete_by_cv_id(&self, cv_id: &str) -> ModelResult<()>;
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub latency_ms: u64,
}

#[async_trait]
pub trait Llm: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> ModelResult<LlmResponse>;

    fn model_id(&self) -> &str;
}

/// A single reranked result: the original `SearchResult` index plus the
/// relevance score the reranking LLM assigned it.
#[derive(Debug, Clone)]
pub struct RerankScore {
    pub index: usize,
    pub relevance: f32,
}

#[async_trait]
pub trait Reranker: Send + Sync {
    async fn score(&self, query: &str, results: &[SearchResult]) -> ModelResult<Vec<RerankScore>>;

    fn model_id(&self) -> &str;
}
