use serde::{Deserialize, Serialize};

use crate::mode::Mode;
use crate::query_understanding::QueryUnderstanding;
use crate::search_result::SearchResult;
use crate::structured_output::StructuredOutput;

/// Per-stage latency, in milliseconds, for one `query()` call (spec §4.13).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageMetrics {
    pub understanding_ms: u64,
    pub guardrail_ms: u64,
    pub embed_ms: u64,
    pub search_ms: u64,
    pub rerank_ms: u64,
    pub generation_ms: u64,
    pub verification_ms: u64,
    pub total_ms: u64,
}

/// Outcome of the verifier (C9): combined groundedness/heuristic confidence
/// plus the claims each check flagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationInfo {
    pub groundedness: Option<f32>,
    pub verified_claims: Vec<String>,
    pub ungrounded_claims: Vec<String>,
    pub heuristic_confidence: f32,
    pub unverified_cv_ids: Vec<String>,
    pub combined_confidence: f32,
    pub warning: Option<String>,
}

/// The final response handed back to the caller and to the eval log.
///
/// `structured_output` (C10) and `structure` (C11/C12) are only populated
/// on the success path — short-circuited (guardrail-rejected, no-hits,
/// degraded) responses carry `None` for both, since there is no LLM
/// free-text to decompose or candidate set to assemble a structure from.
/// `structure` is kept as an opaque [`serde_json::Value`] rather than a
/// typed field: its shape is one of the ten `structure_type` variants
/// `cv-output` defines, and `cv-types` (used by `cv-output` itself) can't
/// depend back on it without a cycle. Spec §6: "Clients MUST treat
/// unknown fields as opaque."
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub metrics: StageMetrics,
    pub confidence: f32,
    pub guardrail_passed: bool,
    pub verification: Option<VerificationInfo>,
    pub query_understanding: QueryUnderstanding,
    pub mode: Mode,
    pub structured_output: Option<StructuredOutput>,
    pub structure: Option<serde_json::Value>,
}
