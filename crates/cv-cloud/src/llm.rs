//! OpenRouter-backed [`cv_models::Llm`] and [`cv_models::Reranker`] (C1, cloud mode).
//!
//! A thin `reqwest` client against OpenRouter's chat-completions endpoint.
//! Request shape and validation mirror the escalation client's
//! request-response discipline: validate before sending, attach a
//! caller-supplied timeout, surface the remote error body rather than a
//! bare status code.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use cv_models::{Llm, LlmResponse, ModelResult, RerankScore, Reranker};
use cv_types::SearchResult;

use crate::error::{CloudError, CloudResult};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const MAX_QUERY_CHARS: usize = 100_000;

/// Chat-completion client for a single OpenRouter model id.
///
/// One instance is built per model (understanding/rerank/generation/
/// verification each get their own, since each has its own configured
/// model id and may be swapped independently).
pub struct OpenRouterLlm {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenRouterLlm {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        }
    }

    fn validate(prompt: &str) -> CloudResult<()> {
        if prompt.is_empty() {
            return Err(CloudError::validation("prompt cannot be empty"));
        }
        if prompt.len() > MAX_QUERY_CHARS {
            return Err(CloudError::validation(format!(
                "prompt too long (max {MAX_QUERY_CHARS} characters)"
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, prompt, system_prompt))]
    async fn complete(&self, prompt: &str, system_prompt: Option<&str>) -> CloudResult<LlmResponse> {
        Self::validate(prompt)?;

        let mut messages = Vec::new();
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
        };

        let start = Instant::now();
        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(OPENROUTER_URL)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send(),
        )
        .await
        .map_err(|_| CloudError::Timeout(self.timeout))?
        .map_err(CloudError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 401 || status.as_u16() == 403 {
                CloudError::auth(body)
            } else {
                CloudError::api(status.as_u16(), body)
            });
        }

        let body: ChatResponse = response.json().await.map_err(CloudError::Http)?;
        let latency_ms = start.elapsed().as_millis() as u64;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        debug!(model = %self.model, latency_ms, "openrouter completion");

        Ok(LlmResponse {
            text,
            prompt_tokens: body.usage.as_ref().map(|u| u.prompt_tokens).unwrap_or(0),
            completion_tokens: body.usage.as_ref().map(|u| u.completion_tokens).unwrap_or(0),
            latency_ms,
        })
    }
}

#[async_trait]
impl Llm for OpenRouterLlm {
    async fn generate(&self, prompt: &str, system_prompt: Option<&str>) -> ModelResult<LlmResponse> {
        self.complete(prompt, system_prompt).await.map_err(Into::into)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// OpenRouter doubles as the reranker: asked to emit a relevance score
/// per candidate chunk as JSON, which is parsed back into [`RerankScore`]s.
/// Falls through to [`cv_models::ModelError`] on any parse failure so the
/// caller's `LlmReranker` can pass results through unchanged.
#[async_trait]
impl Reranker for OpenRouterLlm {
    async fn score(&self, query: &str, results: &[SearchResult]) -> ModelResult<Vec<RerankScore>> {
        if results.is_empty() {
            return Ok(Vec::new());
        }

        let mut prompt = format!(
            "Score how relevant each excerpt below is to the question \"{query}\" on a 0.0-1.0 scale. \
             Reply with a JSON array of floats, one per excerpt, in the same order, and nothing else.\n\n"
        );
        for (i, result) in results.iter().enumerate() {
            prompt.push_str(&format!("[{i}] {}\n\n", result.content));
        }

        let response = self
            .complete(&prompt, Some("You are a precise relevance-scoring assistant."))
            .await?;

        let scores: Vec<f32> = serde_json::from_str(response.text.trim())
            .map_err(|e| cv_models::ModelError::InferenceError(format!("rerank response not valid JSON: {e}")))?;

        if scores.len() != results.len() {
            return Err(cv_models::ModelError::InferenceError(format!(
                "rerank returned {} scores for {} results",
                scores.len(),
                results.len()
            )));
        }

        Ok(scores
            .into_iter()
            .enumerate()
            .map(|(index, relevance)| RerankScore { index, relevance })
            .collect())
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponseChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatResponseChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_prompt() {
        assert!(OpenRouterLlm::validate("").is_err());
    }

    #[test]
    fn rejects_oversized_prompt() {
        let prompt = "x".repeat(MAX_QUERY_CHARS + 1);
        assert!(OpenRouterLlm::validate(&prompt).is_err());
    }

    #[test]
    fn accepts_ordinary_prompt() {
        assert!(OpenRouterLlm::validate("Does Jane know Rust?").is_ok());
    }

    #[test]
    fn model_id_reports_configured_model() {
        let llm = OpenRouterLlm::new("key", "anthropic/claude-3-haiku", Duration::from_secs(30));
        assert_eq!(Llm::model_id(&llm), "anthropic/claude-3-haiku");
    }
}
