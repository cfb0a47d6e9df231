//! # Unified Error Handling for the CV RAG Engine
//!
//! `CvError` is the single error type the orchestrator converts into either
//! a degraded `RagResponse` or a failed request (spec §7: "stages return
//! typed results, the orchestrator is the single place that converts an
//! error into either a degraded response or a failed one").

/// Unified error type for the retrieval-and-answer pipeline.
///
/// Covers the error kinds from spec §7: input validation, guardrail
/// rejection (modeled separately, see [`CvError::is_guardrail_rejection`]),
/// transient/timeout provider failures, empty retrieval, and output
/// parsing/metadata gaps that degrade rather than fail a response.
#[derive(Debug, thiserror::Error)]
pub enum CvError {
    // ==================== Input validation ====================
    /// Empty query or empty PDF/raw text reached a stage that requires it.
    #[error("invalid input: {0}")]
    InputInvalid(String),

    // ==================== Guardrail ====================
    /// Non-error outcome: the guardrail rejected the query. The orchestrator
    /// turns this into a canned response rather than propagating it as a
    /// failure (spec §7).
    #[error("guardrail rejected query: {0}")]
    GuardrailRejection(String),

    // ==================== Provider errors ====================
    /// Transient provider failure (network, 5xx). Retried up to 3 times
    /// for embed/search, never for LLM calls (spec §7).
    #[error("transient provider error in {stage}: {message}")]
    ProviderTransient { stage: String, message: String },

    /// A provider call exceeded its per-stage deadline (spec §5).
    #[error("provider timeout in {stage} after {elapsed_ms}ms")]
    ProviderTimeout { stage: String, elapsed_ms: u64 },

    /// The underlying embedder/LLM/vector-store call failed outright.
    #[error("provider error in {stage}: {message}")]
    ProviderFailed { stage: String, message: String },

    // ==================== Retrieval ====================
    /// Vector search returned zero hits above threshold. Recovered with a
    /// canned "no relevant information" message (spec §4.5, §7).
    #[error("no retrieval hits for query")]
    NoRetrievalHits,

    // ==================== Output parsing ====================
    /// Non-fatal: recorded in `StructuredOutput::parsing_warnings`.
    #[error("output parsing warning: {0}")]
    OutputParsingWarning(String),

    /// A module needed enriched metadata that wasn't computed for a chunk;
    /// the module degrades to parsing the LLM's free text instead.
    #[error("metadata missing for {cv_id}: {field}")]
    MetadataMissing { cv_id: String, field: String },

    // ==================== Storage / config ====================
    #[error("vector store error: {0}")]
    VectorStore(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CvError>;

impl CvError {
    /// User-facing message with actionable next steps, mirroring the
    /// teacher's `with_context()` convenience.
    pub fn with_context(&self) -> String {
        match self {
            CvError::InputInvalid(msg) => {
                format!(
                    "Invalid input: {msg}.\n  → The query or document text was empty\n  → Provide a non-empty question and at least one indexed CV"
                )
            }
            CvError::ProviderTimeout { stage, elapsed_ms } => {
                format!(
                    "{stage} timed out after {elapsed_ms}ms.\n  → The provider may be overloaded\n  → Retry the request\n  → Check RETRIEVAL_K / model configuration"
                )
            }
            CvError::ProviderTransient { stage, message } => {
                format!(
                    "Transient failure in {stage}: {message}.\n  → This was retried automatically and still failed\n  → Check network connectivity\n  → Try again shortly"
                )
            }
            CvError::NoRetrievalHits => {
                "No relevant CV content was found for this query.\n  → Try broadening the question\n  → Confirm CVs are indexed for this session".to_string()
            }
            CvError::MetadataMissing { cv_id, field } => {
                format!(
                    "Missing enriched metadata ({field}) for {cv_id}.\n  → Re-index this CV\n  → The module will fall back to parsing the LLM's free text"
                )
            }
            _ => self.to_string(),
        }
    }

    /// `true` for the guardrail's non-error rejection outcome (spec §7).
    pub fn is_guardrail_rejection(&self) -> bool {
        matches!(self, CvError::GuardrailRejection(_))
    }

    /// `true` for transient failures eligible for the embed/search retry
    /// loop (spec §5, §7). LLM calls are never retried for cost reasons.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CvError::ProviderTransient { .. })
    }

    /// `true` when the orchestrator should degrade by passing the previous
    /// stage's output through unchanged (reranker/verifier timeouts) rather
    /// than propagate the error, instead of failing the whole request
    /// (spec §5: embed/search/generate propagate, rerank/verify recover).
    pub fn is_recoverable_timeout_stage(stage: &str) -> bool {
        matches!(stage, "rerank" | "verify")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guardrail_rejection_is_not_retryable() {
        let err = CvError::GuardrailRejection("off-topic".into());
        assert!(err.is_guardrail_rejection());
        assert!(!err.is_retryable());
    }

    #[test]
    fn provider_transient_is_retryable() {
        let err = CvError::ProviderTransient {
            stage: "embed".into(),
            message: "503".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn context_messages_are_actionable() {
        let err = CvError::NoRetrievalHits;
        assert!(err.with_context().contains("→"));
    }

    #[test]
    fn recoverable_timeout_stages() {
        assert!(CvError::is_recoverable_timeout_stage("rerank"));
        assert!(CvError::is_recoverable_timeout_stage("verify"));
        assert!(!CvError::is_recoverable_timeout_stage("embed"));
        assert!(!CvError::is_recoverable_timeout_stage("generate"));
    }
}
