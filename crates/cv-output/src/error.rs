//! Error types for the structured-output assembly layer.

/// Result type for output-processing operations.
pub type OutputResult<T> = std::result::Result<T, OutputError>;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("no markdown table found in response, and fallback table generation produced no rows")]
    NoTableData,

    #[error("structure assembly failed for query type {query_type}: {reason}")]
    StructureAssembly { query_type: String, reason: String },

    #[error("scoring profile has no usable criteria (all weights zero)")]
    EmptyScoringProfile,

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
