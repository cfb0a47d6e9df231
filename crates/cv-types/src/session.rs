use serde::{Deserialize, Serialize};

use crate::structured_output::StructuredOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of conversation. `structured_output` is set on assistant turns
/// that went through the structured-output layer, so the context resolver
/// can read `cv_references`/`table_data` off it instead of re-parsing raw
/// markdown where possible. Unlike the structured output, a turn carries no
/// query-type tag of its own — callers that need the current turn's
/// `QueryType` (the suggestion engine) take it as an explicit argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub structured_output: Option<StructuredOutput>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            structured_output: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            structured_output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub name: String,
    pub cv_ids: Vec<String>,
    pub messages: Vec<Message>,
}

impl Session {
    pub fn new(session_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            name: name.into(),
            cv_ids: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// The most recent assistant message, if any — what the context
    /// resolver and suggestion engine scan.
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::Assistant))
    }

    /// Last `k` messages, oldest first, for prompt history truncation
    /// (spec §4.7: "last K turns").
    pub fn last_turns(&self, k: usize) -> &[Message] {
        let len = self.messages.len();
        &self.messages[len.saturating_sub(k)..]
    }
}
