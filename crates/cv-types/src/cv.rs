use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single indexed résumé. Immutable once created; deleting a CV removes
/// every chunk derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cv {
    pub cv_id: String,
    pub filename: String,
    pub raw_text: String,
    pub candidate_name: Option<String>,
    pub indexed_at: DateTime<Utc>,
}

impl Cv {
    pub fn new(cv_id: impl Into<String>, filename: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            cv_id: cv_id.into(),
            filename: filename.into(),
            raw_text: raw_text.into(),
            candidate_name: None,
            indexed_at: Utc::now(),
        }
    }

    pub fn with_candidate_name(mut self, name: impl Into<String>) -> Self {
        self.candidate_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_candidate_name() {
        let cv = Cv::new("cv_1", "file.pdf", "text").with_candidate_name("Alice");
        assert_eq!(cv.candidate_name.as_deref(), Some("Alice"));
    }
}
