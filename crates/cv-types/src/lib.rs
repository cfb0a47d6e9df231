//! Shared data model for the CV retrieval-and-answer engine.
//!
//! These types are the "wire" between the engine's crates: chunking and
//! storage (`cv-knowledge`), embedding/generation providers (`cv-models`,
//! `cv-cloud`), the guardrail (`cv-guardrail`), the structured-output layer
//! (`cv-output`), and the orchestrator (`cv-core`) all exchange values
//! defined here rather than ad hoc tuples or JSON maps.

pub mod chunk;
pub mod cv;
pub mod metadata;
pub mod mode;
pub mod query_understanding;
pub mod response;
pub mod scoring_profile;
pub mod search_result;
pub mod session;
pub mod structured_output;

pub use chunk::{Chunk, SectionType};
pub use cv::Cv;
pub use metadata::{EducationLevel, EnrichedMetadata, Seniority};
pub use mode::Mode;
pub use query_understanding::{QueryType, QueryUnderstanding};
pub use response::{RagResponse, StageMetrics, VerificationInfo};
pub use scoring_profile::{Criterion, ScoringProfile};
pub use search_result::SearchResult;
pub use session::{Message, Role, Session};
pub use structured_output::{StructuredOutput, TableRow};
