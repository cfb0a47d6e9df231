//! Generator prompt assembly (C8).
//!
//! Builds the final prompt handed to the generation LLM: system preamble,
//! the last K turns of conversation history, the (reformulated) question,
//! the retrieved chunks rendered with their cv_id and section type, and
//! the explicit requirements list extracted by query understanding.

use cv_types::{Message, Role, SearchResult};

const SYSTEM_PREAMBLE: &str = "You are a recruiting assistant answering questions about a set of \
indexed candidate résumés. Only state facts that are present in the provided CV excerpts. When \
unsure, say so rather than guessing.";

pub struct GenerationPromptInput<'a> {
    pub question: &'a str,
    pub history: &'a [Message],
    pub chunks: &'a [SearchResult],
    pub requirements: &'a [String],
}

/// Returns `(system_prompt, user_prompt)`.
pub fn build_generation_prompt(input: GenerationPromptInput<'_>) -> (String, String) {
    let mut prompt = String::new();

    if !input.history.is_empty() {
        prompt.push_str("## Conversation so far\n\n");
        for message in input.history {
            let role = match message.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            prompt.push_str(&format!("{role}: {}\n", message.content));
        }
        prompt.push('\n');
    }

    prompt.push_str("## Retrieved CV excerpts\n\n");
    if input.chunks.is_empty() {
        prompt.push_str("(none retrieved)\n");
    } else {
        for chunk in input.chunks {
            prompt.push_str(&format!(
                "[cv:{} | {} | {:?}]\n{}\n\n",
                chunk.cv_id, chunk.filename, chunk.section_type, chunk.content
            ));
        }
    }

    if !input.requirements.is_empty() {
        prompt.push_str("## Requirements to address\n\n");
        for requirement in input.requirements {
            prompt.push_str(&format!("- {requirement}\n"));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("## Question\n\n{}\n", input.question));

    (SYSTEM_PREAMBLE.to_string(), prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_types::{EnrichedMetadata, SectionType};

    #[test]
    fn renders_chunks_with_cv_id_and_filename() {
        let chunk = SearchResult {
            cv_id: "cv_abc".into(),
            chunk_id: "chunk_1".into(),
            section_type: SectionType::Experience,
            content: "5 years of Rust experience".into(),
            metadata: EnrichedMetadata::default(),
            similarity: 0.9,
            filename: "abc_Jane_Doe_engineer.pdf".into(),
        };
        let (_, user_prompt) = build_generation_prompt(GenerationPromptInput {
            question: "Does Jane know Rust?",
            history: &[],
            chunks: std::slice::from_ref(&chunk),
            requirements: &["Must know Rust".to_string()],
        });

        assert!(user_prompt.contains("cv:cv_abc"));
        assert!(user_prompt.contains("Must know Rust"));
        assert!(user_prompt.contains("Does Jane know Rust?"));
    }
}
