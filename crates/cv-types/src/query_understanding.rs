use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    SingleCandidate,
    Ranking,
    Comparison,
    Search,
    JobMatch,
    TeamBuild,
    RiskAssessment,
    Verification,
    Summary,
    Initial,
    RedFlags,
}

impl QueryType {
    pub fn is_ranking_like(&self) -> bool {
        matches!(self, QueryType::Ranking | QueryType::Comparison)
    }
}

/// The output of query understanding (C4): classified intent plus a
/// reformulated question the rest of the pipeline should actually answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryUnderstanding {
    pub original: String,
    pub understood: String,
    pub query_type: QueryType,
    pub requirements: Vec<String>,
    pub reformulated_prompt: String,
    pub is_cv_related: bool,
}

impl QueryUnderstanding {
    /// A canned rejection understanding used when guardrails short-circuit
    /// the pipeline before any LLM call.
    pub fn rejected(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            understood: original.clone(),
            reformulated_prompt: original.clone(),
            original,
            query_type: QueryType::Initial,
            requirements: Vec::new(),
            is_cv_related: false,
        }
    }
}
