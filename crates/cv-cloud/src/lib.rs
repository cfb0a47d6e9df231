//! # CV Cloud — remote provider implementations
//!
//! `cv-core` programs against `cv_models::{Llm, Reranker, VectorStore}`;
//! this crate is the cloud-mode side of those seams, reached through
//! plain HTTPS instead of the local SQLite store and placeholder
//! embedder `cv-knowledge`/`cv-models` provide. `OpenRouterLlm` covers
//! understanding, reranking, generation and verification — one instance
//! per configured model id, since each stage may point at a different
//! model. `OpenRouterEmbedder` covers embedding — OpenRouter proxies a
//! handful of dedicated embedding models behind the same bearer-token
//! REST shape. `SupabaseVectorStore` covers retrieval and ingestion
//! storage.
//!
//! ## What's gone from the teacher
//!
//! The QUIC tunnel, billing ledger, LoRA upload, collaborator invites and
//! device-telemetry heartbeat this crate's predecessor carried have no
//! counterpart here: cloud mode in this engine is request/response REST,
//! not a persistent mesh connection with its own wire protocol.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cv_cloud::{OpenRouterEmbedder, OpenRouterLlm, SupabaseVectorStore};
//!
//! let embedder = Arc::new(OpenRouterEmbedder::new(
//!     "sk-or-...",
//!     "openai/text-embedding-3-small",
//!     1536,
//!     Duration::from_secs(30),
//! ));
//! let generation_llm = Arc::new(OpenRouterLlm::new(
//!     "sk-or-...",
//!     "anthropic/claude-3-haiku",
//!     Duration::from_secs(120),
//! ));
//! let store = Arc::new(SupabaseVectorStore::new(
//!     "https://project.supabase.co",
//!     "service-role-key",
//!     1536,
//! ));
//! ```

#![warn(missing_docs)]

pub mod embedder;
pub mod error;
pub mod llm;
pub mod vector_store;

pub use embedder::OpenRouterEmbedder;
pub use error::{CloudError, CloudResult};
pub use llm::OpenRouterLlm;
pub use vector_store::SupabaseVectorStore;
