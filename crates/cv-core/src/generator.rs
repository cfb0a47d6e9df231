//! Generator (C8)
//!
//! Builds the final prompt from the system preamble, conversation history,
//! the (reformulated) question, the retrieved chunks and the explicit
//! requirements list (`cv_models::prompt::build_generation_prompt`), then
//! calls the generation LLM. Tokens-in/out and latency are captured into
//! `StageMetrics::generation_ms` by the caller; this module only reports
//! the raw `LlmResponse` timing.

use tracing::instrument;

use cv_models::prompt::{build_generation_prompt, GenerationPromptInput};
use cv_models::{Llm, LlmResponse};
use cv_types::{Message, SearchResult};

use crate::error::{CvError, Result};

pub struct Generator<'a> {
    llm: &'a dyn Llm,
}

impl<'a> Generator<'a> {
    pub fn new(llm: &'a dyn Llm) -> Self {
        Self { llm }
    }

    #[instrument(skip(self, question, history, chunks, requirements))]
    pub async fn generate(
        &self,
        question: &str,
        history: &[Message],
        chunks: &[SearchResult],
        requirements: &[String],
    ) -> Result<LlmResponse> {
        let (system_prompt, user_prompt) = build_generation_prompt(GenerationPromptInput {
            question,
            history,
            chunks,
            requirements,
        });

        self.llm
            .generate(&user_prompt, Some(&system_prompt))
            .await
            .map_err(|e| CvError::ProviderFailed {
                stage: "generate".to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cv_models::ModelResult;

    struct StubLlm;

    #[async_trait]
    impl Llm for StubLlm {
        async fn generate(&self, prompt: &str, _system_prompt: Option<&str>) -> ModelResult<LlmResponse> {
            Ok(LlmResponse {
                text: format!("answer for: {prompt}"),
                prompt_tokens: 5,
                completion_tokens: 5,
                latency_ms: 1,
            })
        }

        fn model_id(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn generate_renders_prompt_and_returns_llm_text() {
        let llm = StubLlm;
        let generator = Generator::new(&llm);
        let response = generator
            .generate("Does Jane know Rust?", &[], &[], &[])
            .await
            .unwrap();
        assert!(response.text.contains("Does Jane know Rust?"));
    }
}
