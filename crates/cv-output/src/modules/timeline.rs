//! Timeline and experience-distribution modules.
//!
//! Grounded on `original_source/.../timeline_module.py` and
//! `experience_distribution_module.py`.

use cv_types::EnrichedMetadata;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimelineEntry {
    pub position: String,
    pub years: f32,
}

/// `position_experience_years`, most recent/longest first, as stored —
/// the chunker already orders positions chronologically (spec §4.1).
pub fn timeline(metadata: &EnrichedMetadata) -> Vec<TimelineEntry> {
    metadata
        .position_experience_years
        .iter()
        .map(|(position, years)| TimelineEntry {
            position: position.clone(),
            years: *years,
        })
        .collect()
}

/// Bucket counts of `total_experience_years` across a set of candidates:
/// junior (<2y), mid (2-5y), senior (5-10y), principal (10y+).
pub fn experience_distribution(candidates: &[EnrichedMetadata]) -> [(&'static str, u32); 4] {
    let mut buckets = [("0-2 years", 0u32), ("2-5 years", 0), ("5-10 years", 0), ("10+ years", 0)];
    for metadata in candidates {
        let years = metadata.total_experience_years;
        let idx = if years < 2.0 {
            0
        } else if years < 5.0 {
            1
        } else if years < 10.0 {
            2
        } else {
            3
        };
        buckets[idx].1 += 1;
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_candidates_by_experience() {
        let candidates = vec![
            EnrichedMetadata { total_experience_years: 1.0, ..Default::default() },
            EnrichedMetadata { total_experience_years: 11.0, ..Default::default() },
        ];
        let dist = experience_distribution(&candidates);
        assert_eq!(dist[0].1, 1);
        assert_eq!(dist[3].1, 1);
    }
}
