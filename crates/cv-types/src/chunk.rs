use serde::{Deserialize, Serialize};

use crate::metadata::EnrichedMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Summary,
    Experience,
    Skills,
    Education,
    Certifications,
    FullCv,
    General,
}

/// An indexed unit of CV content. For a given `cv_id` there is exactly one
/// chunk with `section_type == Summary` and `chunk_index == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub cv_id: String,
    pub chunk_index: u32,
    pub section_type: SectionType,
    pub content: String,
    pub metadata: EnrichedMetadata,
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    pub fn is_summary(&self) -> bool {
        self.chunk_index == 0 && matches!(self.section_type, SectionType::Summary)
    }
}
