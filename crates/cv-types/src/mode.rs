use serde::{Deserialize, Serialize};

/// Whether providers (embedder, vector store, LLM) are backed by local
/// implementations (`cv-knowledge`/`cv-models`) or cloud ones (`cv-cloud`).
/// Mirrors `DEFAULT_MODE` (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Local,
    Cloud,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Local
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Local => write!(f, "local"),
            Mode::Cloud => write!(f, "cloud"),
        }
    }
}
