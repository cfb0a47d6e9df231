//! # CV Core — RAG Orchestration Engine
//!
//! This crate implements the heart of the CV retrieval-and-answer engine: the
//! pipeline that turns a natural-language question about a set of indexed
//! résumés into a grounded, sourced answer.
//!
//! ## Architecture Overview
//!
//! Every query passes through the same sequence of stages, each owned by a
//! dedicated module:
//!
//! - [`context`] (C3): resolves back-references ("the first one", "him") in
//!   the conversation history into an explicit, self-contained question.
//! - [`query_understanding`] (C4): classifies the question's intent with a
//!   fast LLM call and decides whether it's CV-related at all.
//! - `cv_guardrail::Guardrail` (C5): rejects off-topic or prompt-injection
//!   queries before any retrieval happens.
//! - `cv_knowledge::RetrievalEngine` / `cv_knowledge::LlmReranker` (C6, C7):
//!   adaptive vector search plus an optional LLM-scored reorder.
//! - [`generator`] (C8): builds the final prompt and calls the generation LLM.
//! - [`verifier`] (C9): combines heuristic and (optional) LLM groundedness
//!   checks into a single confidence score.
//! - [`suggestions`] (C13): picks follow-up question suggestions for the
//!   caller to offer after each answer.
//! - [`eval_log`] (C15): appends one JSON line per query for offline review.
//! - `cv_output::OutputProcessor` / `StructureRouter` (C10, C11, C12): parse
//!   the LLM's markdown into thinking/analysis/conclusion/table pieces and
//!   assemble the query-type-specific structure on top of them.
//! - [`orchestrator`]: ties all of the above into `RagService::query`.
//!
//! ## Consensus is not a concept here
//!
//! Unlike systems that reconcile multiple agents' opinions through a voting
//! round, this pipeline is a straight line: one retrieval pass, one
//! generation call, one verification pass, one structure assembly. Where a
//! spec invariant asks for computed data to win over LLM prose (ranking
//! top picks, verification conclusions), `cv-output`'s structures enforce
//! that when `RagService::query` assembles `RagResponse::structure`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cv_core::{RagConfig, RagServiceBuilder, QueryRequest};
//! use cv_models::{LocalEmbedder, LocalLlm};
//! use cv_types::Mode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RagConfig::default();
//!     let embedder = Arc::new(LocalEmbedder::new(384));
//!     let llm = Arc::new(LocalLlm::new());
//!
//!     let service = RagServiceBuilder::new(config, Mode::Local)
//!         .embedder(embedder)
//!         .understanding_llm(llm.clone())
//!         .generation_llm(llm)
//!         .store(todo!("a cv_models::VectorStore implementation"))
//!         .build()?;
//!
//!     let response = service
//!         .query(QueryRequest {
//!             question: "Who has the most Rust experience?",
//!             session_id: None,
//!             history: &[],
//!             cv_ids: None,
//!             total_cvs_in_session: 1,
//!             k: None,
//!             threshold: None,
//!         })
//!         .await?;
//!
//!     println!("{}", response.answer);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod eval_log;
pub mod generator;
pub mod orchestrator;
pub mod query_understanding;
pub mod suggestions;
pub mod verifier;

pub use config::{DefaultMode, RagConfig, TimeoutConfig};
pub use context::resolve_query_with_context;
pub use error::{CvError, Result};
pub use eval_log::{EvalLog, EvalLogRecord};
pub use generator::Generator;
pub use orchestrator::{DocumentInput, QueryRequest, RagService, RagServiceBuilder};
pub use query_understanding::QueryUnderstander;
pub use suggestions::{ContextExtractor, ExtractedContext, Suggestion, SuggestionEngine, SuggestionSelector};
pub use verifier::Verifier;
