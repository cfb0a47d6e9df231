//! Query Understanding (C4)
//!
//! Calls a fast LLM with a classification prompt and turns its JSON reply
//! into a [`QueryUnderstanding`]. If `is_cv_related` comes back `false` the
//! orchestrator short-circuits before retrieval or generation (spec §4.3).

use serde::Deserialize;
use tracing::{instrument, warn};

use cv_models::Llm;
use cv_types::{QueryType, QueryUnderstanding};

use crate::error::{CvError, Result};

const CLASSIFICATION_SYSTEM_PROMPT: &str = "You classify a user's question about a set of \
indexed candidate résumés. Respond with a single JSON object and nothing else: \
{\"is_cv_related\": bool, \"query_type\": one of \"single_candidate\", \"ranking\", \
\"comparison\", \"search\", \"job_match\", \"team_build\", \"risk_assessment\", \
\"verification\", \"summary\", \"red_flags\", \"understood\": string restating the question, \
\"reformulated_prompt\": string, the question rewritten to be self-contained, \
\"requirements\": array of short requirement strings extracted from the question}.";

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    is_cv_related: bool,
    query_type: RawQueryType,
    understood: String,
    reformulated_prompt: String,
    #[serde(default)]
    requirements: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawQueryType {
    SingleCandidate,
    Ranking,
    Comparison,
    Search,
    JobMatch,
    TeamBuild,
    RiskAssessment,
    Verification,
    Summary,
    RedFlags,
}

impl From<RawQueryType> for QueryType {
    fn from(raw: RawQueryType) -> Self {
        match raw {
            RawQueryType::SingleCandidate => QueryType::SingleCandidate,
            RawQueryType::Ranking => QueryType::Ranking,
            RawQueryType::Comparison => QueryType::Comparison,
            RawQueryType::Search => QueryType::Search,
            RawQueryType::JobMatch => QueryType::JobMatch,
            RawQueryType::TeamBuild => QueryType::TeamBuild,
            RawQueryType::RiskAssessment => QueryType::RiskAssessment,
            RawQueryType::Verification => QueryType::Verification,
            RawQueryType::Summary => QueryType::Summary,
            RawQueryType::RedFlags => QueryType::RedFlags,
        }
    }
}

/// Classifies a (context-resolved) query using a fast LLM.
pub struct QueryUnderstander<'a> {
    llm: &'a dyn Llm,
}

impl<'a> QueryUnderstander<'a> {
    pub fn new(llm: &'a dyn Llm) -> Self {
        Self { llm }
    }

    #[instrument(skip(self, query))]
    pub async fn understand(&self, query: &str) -> Result<QueryUnderstanding> {
        let user_prompt = format!("Question: {query}");
        let response = self
            .llm
            .generate(&user_prompt, Some(CLASSIFICATION_SYSTEM_PROMPT))
            .await
            .map_err(|e| CvError::ProviderFailed {
                stage: "query_understanding".to_string(),
                message: e.to_string(),
            })?;

        match parse_classification(&response.text) {
            Ok(parsed) => Ok(QueryUnderstanding {
                original: query.to_string(),
                understood: parsed.understood,
                query_type: parsed.query_type.into(),
                requirements: parsed.requirements,
                reformulated_prompt: parsed.reformulated_prompt,
                is_cv_related: parsed.is_cv_related,
            }),
            Err(e) => {
                warn!("query understanding response did not parse as JSON: {e}, falling back to a permissive default");
                Ok(QueryUnderstanding {
                    original: query.to_string(),
                    understood: query.to_string(),
                    query_type: QueryType::Search,
                    requirements: Vec::new(),
                    reformulated_prompt: query.to_string(),
                    is_cv_related: true,
                })
            }
        }
    }
}

fn parse_classification(raw: &str) -> std::result::Result<ClassificationResponse, serde_json::Error> {
    let trimmed = raw.trim();
    let json_slice = trimmed
        .find('{')
        .and_then(|start| trimmed.rfind('}').map(|end| &trimmed[start..=end]))
        .unwrap_or(trimmed);
    serde_json::from_str(json_slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cv_models::{LlmResponse, ModelResult};

    struct StubLlm {
        reply: String,
    }

    #[async_trait]
    impl Llm for StubLlm {
        async fn generate(&self, _prompt: &str, _system_prompt: Option<&str>) -> ModelResult<LlmResponse> {
            Ok(LlmResponse {
                text: self.reply.clone(),
                prompt_tokens: 10,
                completion_tokens: 10,
                latency_ms: 1,
            })
        }

        fn model_id(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn parses_well_formed_classification() {
        let llm = StubLlm {
            reply: r#"{"is_cv_related": true, "query_type": "ranking", "understood": "rank candidates by Rust skill",
                "reformulated_prompt": "Rank all candidates by Rust experience", "requirements": ["Rust"]}"#
                .to_string(),
        };
        let understander = QueryUnderstander::new(&llm);
        let result = understander.understand("who's best at rust?").await.unwrap();
        assert!(result.is_cv_related);
        assert_eq!(result.query_type, QueryType::Ranking);
        assert_eq!(result.requirements, vec!["Rust".to_string()]);
    }

    #[tokio::test]
    async fn falls_back_permissively_on_malformed_response() {
        let llm = StubLlm {
            reply: "not json at all".to_string(),
        };
        let understander = QueryUnderstander::new(&llm);
        let result = understander.understand("does jane know aws?").await.unwrap();
        assert!(result.is_cv_related);
        assert_eq!(result.query_type, QueryType::Search);
    }

    #[tokio::test]
    async fn flags_non_cv_related_query() {
        let llm = StubLlm {
            reply: r#"{"is_cv_related": false, "query_type": "search", "understood": "weather request",
                "reformulated_prompt": "what's the weather", "requirements": []}"#
                .to_string(),
        };
        let understander = QueryUnderstander::new(&llm);
        let result = understander.understand("what's the weather today?").await.unwrap();
        assert!(!result.is_cv_related);
    }
}
