//! Gap-analysis module — which stated requirements no candidate in the
//! session satisfies at all.
//!
//! Grounded on `original_source/.../gap_analysis_module.py`.

use cv_types::EnrichedMetadata;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GapAnalysis {
    pub fully_uncovered: Vec<String>,
    pub partially_covered: Vec<String>,
    pub narrative: String,
}

pub fn analyze(candidates: &[EnrichedMetadata], requirements: &[String]) -> GapAnalysis {
    let mut fully_uncovered = Vec::new();
    let mut partially_covered = Vec::new();

    for requirement in requirements {
        let needle = requirement.to_lowercase();
        let coverage = candidates
            .iter()
            .filter(|m| m.skills.iter().any(|s| s.to_lowercase().contains(&needle)))
            .count();
        if coverage == 0 {
            fully_uncovered.push(requirement.clone());
        } else if coverage < candidates.len() {
            partially_covered.push(requirement.clone());
        }
    }

    let narrative = if fully_uncovered.is_empty() {
        "Every stated requirement is covered by at least one candidate.".to_string()
    } else {
        format!(
            "No indexed candidate covers: {}. Consider broadening the search or the requirements.",
            fully_uncovered.join(", ")
        )
    };

    GapAnalysis { fully_uncovered, partially_covered, narrative }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_fully_uncovered_requirement() {
        let candidates = vec![EnrichedMetadata { skills: vec!["rust".to_string()], ..Default::default() }];
        let gaps = analyze(&candidates, &["rust".to_string(), "cobol".to_string()]);
        assert_eq!(gaps.fully_uncovered, vec!["cobol".to_string()]);
    }
}
