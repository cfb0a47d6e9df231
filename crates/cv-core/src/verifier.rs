//! Verifier (C9)
//!
//! Two checks combine into the confidence the caller sees:
//!
//! 1. **LLM verification** (optional): asks the verification LLM whether
//!    each factual claim in the answer is entailed by the retrieved
//!    chunks, returning a `groundedness` score plus verified/ungrounded
//!    claim lists.
//! 2. **Heuristic**: regex-extracts `cv:cv_xxx` references and bolded
//!    candidate names from the answer and checks each appears in the
//!    retrieved chunk set (by `cv_id` or filename/content match).
//!
//! `combined_confidence = 0.6*groundedness + 0.4*heuristic` when LLM
//! verification ran, else the heuristic confidence alone (spec §4.8).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{instrument, warn};

use cv_models::Llm;
use cv_types::{SearchResult, VerificationInfo};

use crate::error::{CvError, Result};

static CV_ID_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"cv:(cv_[a-zA-Z0-9_-]+)").unwrap());
static BOLD_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([A-Z][\p{L}'.-]+(?:\s+[A-Z][\p{L}'.-]+)+)\*\*").unwrap()
});

const VERIFICATION_SYSTEM_PROMPT: &str = "You check whether an answer's factual claims about \
candidate résumés are supported by the provided CV excerpts. Respond with a single JSON object \
and nothing else: {\"groundedness\": float between 0 and 1, \"verified_claims\": array of short \
claim strings that are supported, \"ungrounded_claims\": array of short claim strings that are \
NOT supported by the excerpts}.";

#[derive(Debug, Deserialize)]
struct LlmVerification {
    groundedness: f32,
    #[serde(default)]
    verified_claims: Vec<String>,
    #[serde(default)]
    ungrounded_claims: Vec<String>,
}

/// Heuristic check result: cv_id/name mentions matched against the
/// retrieved chunk set.
struct HeuristicResult {
    confidence: f32,
    unverified_cv_ids: Vec<String>,
}

fn heuristic_check(answer: &str, chunks: &[SearchResult]) -> HeuristicResult {
    let known_cv_ids: std::collections::HashSet<&str> =
        chunks.iter().map(|c| c.cv_id.as_str()).collect();

    let mentioned_ids: Vec<String> = CV_ID_MENTION
        .captures_iter(answer)
        .map(|c| c[1].to_string())
        .collect();

    let mentioned_names: Vec<String> = BOLD_NAME
        .captures_iter(answer)
        .map(|c| c[1].trim().to_string())
        .collect();

    let mut total = 0usize;
    let mut verified = 0usize;
    let mut unverified_cv_ids = Vec::new();

    for id in &mentioned_ids {
        total += 1;
        if known_cv_ids.contains(id.as_str()) {
            verified += 1;
        } else {
            unverified_cv_ids.push(id.clone());
        }
    }

    for name in &mentioned_names {
        total += 1;
        let name_lower = name.to_lowercase();
        let found = chunks.iter().any(|c| {
            c.filename.to_lowercase().contains(&name_lower)
                || c.content.to_lowercase().contains(&name_lower)
        });
        if found {
            verified += 1;
        }
    }

    let confidence = if total == 0 {
        1.0
    } else {
        verified as f32 / total as f32
    };

    HeuristicResult {
        confidence,
        unverified_cv_ids,
    }
}

pub struct Verifier<'a> {
    llm: Option<&'a dyn Llm>,
}

impl<'a> Verifier<'a> {
    /// `llm = None` disables the LLM-based check; only the heuristic runs.
    pub fn new(llm: Option<&'a dyn Llm>) -> Self {
        Self { llm }
    }

    #[instrument(skip(self, answer, chunks))]
    pub async fn verify(&self, answer: &str, chunks: &[SearchResult]) -> Result<VerificationInfo> {
        let heuristic = heuristic_check(answer, chunks);

        let llm_result = match self.llm {
            Some(llm) => self.run_llm_verification(answer, chunks, llm).await,
            None => None,
        };

        let (groundedness, verified_claims, ungrounded_claims, combined_confidence) = match &llm_result {
            Some(v) => (
                Some(v.groundedness),
                v.verified_claims.clone(),
                v.ungrounded_claims.clone(),
                0.6 * v.groundedness + 0.4 * heuristic.confidence,
            ),
            None => (None, Vec::new(), Vec::new(), heuristic.confidence),
        };

        let warning = if combined_confidence < 0.6 || !heuristic.unverified_cv_ids.is_empty() {
            Some(
                "⚠️ Some statements in this answer could not be fully verified against the \
                 indexed résumés."
                    .to_string(),
            )
        } else {
            None
        };

        Ok(VerificationInfo {
            groundedness,
            verified_claims,
            ungrounded_claims,
            heuristic_confidence: heuristic.confidence,
            unverified_cv_ids: heuristic.unverified_cv_ids,
            combined_confidence,
            warning,
        })
    }

    async fn run_llm_verification(
        &self,
        answer: &str,
        chunks: &[SearchResult],
        llm: &dyn Llm,
    ) -> Option<LlmVerification> {
        let mut prompt = String::from("## Answer to verify\n\n");
        prompt.push_str(answer);
        prompt.push_str("\n\n## Retrieved CV excerpts\n\n");
        for chunk in chunks {
            prompt.push_str(&format!("[cv:{}] {}\n", chunk.cv_id, chunk.content));
        }

        let response = match llm.generate(&prompt, Some(VERIFICATION_SYSTEM_PROMPT)).await {
            Ok(r) => r,
            Err(e) => {
                warn!("verification LLM call failed, falling back to heuristic only: {e}");
                return None;
            }
        };

        match parse_verification(&response.text) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("verification response did not parse as JSON: {e}, falling back to heuristic only");
                None
            }
        }
    }
}

fn parse_verification(raw: &str) -> std::result::Result<LlmVerification, serde_json::Error> {
    let trimmed = raw.trim();
    let json_slice = trimmed
        .find('{')
        .and_then(|start| trimmed.rfind('}').map(|end| &trimmed[start..=end]))
        .unwrap_or(trimmed);
    let mut parsed: LlmVerification = serde_json::from_str(json_slice)?;
    parsed.groundedness = parsed.groundedness.clamp(0.0, 1.0);
    Ok(parsed)
}

/// Converts an error from a failed/timed-out verification stage into a
/// recoverable `None` confidence rather than propagating (spec §5: verify
/// timeouts are recovered, not fatal).
pub fn recover_from_timeout(stage_error: &CvError) -> bool {
    matches!(stage_error, CvError::ProviderTimeout { stage, .. } if stage == "verify")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cv_models::{LlmResponse, ModelResult};
    use cv_types::EnrichedMetadata;

    fn chunk(cv_id: &str, filename: &str, content: &str) -> SearchResult {
        SearchResult {
            cv_id: cv_id.to_string(),
            chunk_id: format!("{cv_id}-chunk"),
            section_type: cv_types::SectionType::Experience,
            content: content.to_string(),
            metadata: EnrichedMetadata::default(),
            similarity: 0.9,
            filename: filename.to_string(),
        }
    }

    struct StubLlm {
        reply: String,
    }

    #[async_trait]
    impl Llm for StubLlm {
        async fn generate(&self, _prompt: &str, _system_prompt: Option<&str>) -> ModelResult<LlmResponse> {
            Ok(LlmResponse {
                text: self.reply.clone(),
                prompt_tokens: 1,
                completion_tokens: 1,
                latency_ms: 1,
            })
        }

        fn model_id(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn heuristic_only_flags_unknown_cv_id() {
        let verifier = Verifier::new(None);
        let chunks = vec![chunk("cv_abc", "abc_Jane_Doe.pdf", "Jane Doe has 5 years of Rust")];
        let info = verifier
            .verify("According to [cv:cv_zzz], **Jane Doe** knows Rust.", &chunks)
            .await
            .unwrap();
        assert!(info.groundedness.is_none());
        assert_eq!(info.unverified_cv_ids, vec!["cv_zzz".to_string()]);
        assert!(info.combined_confidence < 1.0);
        assert!(info.warning.is_some());
    }

    #[tokio::test]
    async fn heuristic_confidence_is_one_with_no_claims() {
        let verifier = Verifier::new(None);
        let info = verifier.verify("General statement with no references.", &[]).await.unwrap();
        assert!((info.combined_confidence - 1.0).abs() < 1e-6);
        assert!(info.warning.is_none());
    }

    #[tokio::test]
    async fn combines_llm_groundedness_with_heuristic() {
        let llm = StubLlm {
            reply: r#"{"groundedness": 0.9, "verified_claims": ["knows rust"], "ungrounded_claims": []}"#
                .to_string(),
        };
        let verifier = Verifier::new(Some(&llm));
        let chunks = vec![chunk("cv_abc", "abc_Jane.pdf", "Jane Doe knows rust")];
        let info = verifier.verify("**Jane Doe** knows Rust.", &chunks).await.unwrap();
        assert_eq!(info.groundedness, Some(0.9));
        // 0.6*0.9 + 0.4*1.0 = 0.94
        assert!((info.combined_confidence - 0.94).abs() < 0.01);
    }

    #[tokio::test]
    async fn malformed_llm_response_falls_back_to_heuristic() {
        let llm = StubLlm {
            reply: "not json".to_string(),
        };
        let verifier = Verifier::new(Some(&llm));
        let info = verifier.verify("No references here.", &[]).await.unwrap();
        assert!(info.groundedness.is_none());
        assert!((info.combined_confidence - 1.0).abs() < 1e-6);
    }
}
