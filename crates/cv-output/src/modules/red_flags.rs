//! Red-flags module — a flat list view of [`crate::modules::risk`] factors
//! at `Moderate`/`High` across a set of candidates, for a dedicated
//! "red flags" structure rather than the full per-criteria risk table.
//!
//! Grounded on `original_source/.../red_flags_module.py`.

use cv_types::EnrichedMetadata;

use crate::modules::risk::{self, RiskLevel};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RedFlag {
    pub candidate_name: String,
    pub factor: String,
    pub level: RiskLevel,
    pub detail: String,
}

pub fn collect(candidates: &[(String, EnrichedMetadata)]) -> Vec<RedFlag> {
    candidates
        .iter()
        .flat_map(|(name, metadata)| {
            let assessment = risk::assess("", name.clone(), metadata);
            assessment
                .factors
                .into_iter()
                .filter(|f| f.level != RiskLevel::Low)
                .map(move |f| RedFlag {
                    candidate_name: name.clone(),
                    factor: f.name,
                    level: f.level,
                    detail: f.detail,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_flags_only_from_risky_candidates() {
        let safe = EnrichedMetadata::default();
        let risky = EnrichedMetadata { employment_gap_count: 3, ..Default::default() };
        let candidates = vec![("Safe".to_string(), safe), ("Risky".to_string(), risky)];
        let flags = collect(&candidates);
        assert!(flags.iter().all(|f| f.candidate_name == "Risky"));
        assert!(!flags.is_empty());
    }
}
