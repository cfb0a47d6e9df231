use serde::{Deserialize, Serialize};

/// A single parsed row from a markdown table in an LLM's response, or from
/// a fallback table synthesized directly from retrieved chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    pub candidate_name: String,
    pub cv_id: Option<String>,
    pub columns: Vec<(String, String)>,
    /// Always clamped to `[0, 100]` by the parser that produces it.
    pub match_score: Option<f32>,
}

impl TableRow {
    pub fn new(candidate_name: impl Into<String>) -> Self {
        Self {
            candidate_name: candidate_name.into(),
            cv_id: None,
            columns: Vec::new(),
            match_score: None,
        }
    }

    /// Key used for de-duplication: case-folded, whitespace-trimmed name.
    pub fn dedup_key(&self) -> String {
        self.candidate_name.trim().to_lowercase()
    }
}

/// The five-part decomposition of an LLM's free-text markdown answer
/// (spec §4.9 / C10).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StructuredOutput {
    pub direct_answer: String,
    pub raw_content: String,
    pub thinking: Option<String>,
    pub analysis: Option<String>,
    pub conclusion: Option<String>,
    pub table_data: Option<Vec<TableRow>>,
    pub cv_references: Vec<String>,
    pub parsing_warnings: Vec<String>,
    pub fallback_used: bool,
}
