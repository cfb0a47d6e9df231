use serde::{Deserialize, Serialize};

use crate::chunk::SectionType;
use crate::metadata::EnrichedMetadata;

/// A single retrieved chunk, scored against a query.
///
/// `similarity` is in `[0, 1]` for plain cosine results; fused (RRF) scores
/// can exceed `1.0` and callers that compare across search strategies must
/// detect and rescale them (spec §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub cv_id: String,
    pub chunk_id: String,
    pub section_type: SectionType,
    pub content: String,
    pub metadata: EnrichedMetadata,
    pub similarity: f32,
    pub filename: String,
}

impl SearchResult {
    /// `true` when `similarity` is outside the plain cosine range, i.e. it
    /// came from a fused ranking (RRF) and needs rescaling before display.
    pub fn is_fused_score(&self) -> bool {
        self.similarity > 1.0
    }
}
