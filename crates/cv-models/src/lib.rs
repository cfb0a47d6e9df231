//! Provider traits and local placeholder implementations (C1, C8).
//!
//! `provider` defines the `Embedder` / `VectorStore` / `Llm` / `Reranker`
//! seams the orchestrator programs against; `local` implements `Embedder`
//! and `Llm` with deterministic, model-free placeholders so the rest of
//! the pipeline can run without a model file on disk. `cv-knowledge`
//! implements `VectorStore` locally (SQLite); `cv-cloud` implements all
//! four against OpenRouter/Supabase.
//!
//! The teacher's hardware-detection and GGUF-download machinery
//! (`hardware`, `downloader`, `manifest`, `registry`, `inference`) has no
//! counterpart here — this engine treats model weights as an external
//! concern reached only through the provider traits — and was dropped in
//! the final trim.

pub mod local;
pub mod prompt;
pub mod provider;

pub use local::{LocalEmbedder, LocalLlm};
pub use prompt::{build_generation_prompt, GenerationPromptInput};
pub use provider::{
    EmbeddedChunk, Embedder, EmbeddingBatch, Llm, LlmResponse, RerankScore, Reranker, VectorStore,
    VectorStoreStats,
};

/// Result type for model operations
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Model error types
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Model not loaded: {0}")]
    NotLoaded(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: u32, actual: u32 },

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
