//! # CV Output
//!
//! Structured-output assembly layer (C10, C11, C12, C14): turns an LLM's
//! free-text markdown answer plus the retrieved/scored candidates into a
//! typed [`structures::Structure`] the caller can render or serialize,
//! instead of handing back raw markdown.
//!
//! ## Pipeline
//!
//! 1. [`output_processor::OutputProcessor`] (C10) splits the LLM's raw
//!    text into thinking/analysis/conclusion/direct-answer/table pieces.
//! 2. [`scoring::ScoringService`] (C14) scores each candidate in the
//!    session against a [`cv_types::ScoringProfile`].
//! 3. [`modules`] (C12) provide the reusable per-query-type building
//!    blocks (risk table, match score, ranking, team synergy, ...).
//! 4. [`structures::StructureRouter`] (C11) picks one [`structures::Structure`]
//!    variant per [`cv_types::QueryType`] and assembles it from 1-3.
//!
//! The corpus has no single analog for this layer (see `DESIGN.md`); it
//! draws its module/structure split from
//! `examples/original_source/backend/app/services/output_processor/`.

pub mod error;
pub mod modules;
pub mod output_processor;
pub mod scoring;
pub mod structures;

pub use error::{OutputError, OutputResult};
pub use output_processor::OutputProcessor;
pub use scoring::{CandidateScore, Grade, ScoringService};
pub use structures::{CandidateContext, Structure, StructureContext, StructureRouter};
