//! # CV Knowledge
//!
//! Turns raw CV text into ordered, enriched [`cv_types::Chunk`]s (C2),
//! stores and searches them in a local SQLite-backed [`VectorStore`]
//! implementation (C1, local mode), and layers an adaptive retrieval
//! strategy with cv-id diversification on top (C6), plus an LLM-scored
//! reranking pass (C7).
//!
//! ## Architecture
//!
//! - **Chunker** ([`chunker::Chunker`]): filename parsing, section
//!   segmentation, position/date extraction, metadata enrichment.
//! - **Vault** ([`vault::SqliteVectorStore`]): SQLite storage implementing
//!   `cv_models::VectorStore`, with a VSS fast path and a manual
//!   cosine-similarity fallback.
//! - **Retrieval** ([`search::RetrievalEngine`]): adaptive `k`/threshold
//!   selection and per-cv diversification on top of the vector store.
//! - **Reranker** ([`rerank::LlmReranker`]): optional LLM-scored re-sort,
//!   pass-through on failure.

pub mod chunker;
pub mod ingest;
pub mod rerank;
pub mod search;
pub mod vault;

pub use chunker::{Chunker, ChunkerConfig};
pub use ingest::{IngestResult, Ingestor};
pub use rerank::LlmReranker;
pub use search::{RetrievalEngine, RetrievalOptions};
pub use vault::SqliteVectorStore;

/// Result type for knowledge operations
pub type KnowledgeResult<T> = std::result::Result<T, KnowledgeError>;

/// Knowledge error types
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("CV not found: {0}")]
    NotFound(String),

    #[error("Invalid CV text: {0}")]
    InvalidFormat(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: u32, actual: u32 },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("Model error: {0}")]
    ModelError(#[from] cv_models::ModelError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<KnowledgeError> for cv_models::ModelError {
    fn from(err: KnowledgeError) -> Self {
        cv_models::ModelError::Internal(err.to_string())
    }
}
