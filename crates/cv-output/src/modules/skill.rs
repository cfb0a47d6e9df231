//! Skill matrix, distribution and coverage modules.
//!
//! Grounded on `original_source/.../skill_matrix_module.py`,
//! `skill_distribution_module.py` and `skill_coverage_module.py`: all three
//! fold the session's candidates' `EnrichedMetadata.skills` against a list
//! of skills of interest (stated requirements, or the union across
//! candidates when none were stated).

use std::collections::HashMap;

use cv_types::EnrichedMetadata;

/// Per-candidate, per-skill presence grid, for a "skill matrix" table.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SkillMatrix {
    pub skills: Vec<String>,
    /// `(candidate_name, [has_skill; skills.len()])`
    pub rows: Vec<(String, Vec<bool>)>,
}

pub fn build_matrix(candidates: &[(String, EnrichedMetadata)], skills: &[String]) -> SkillMatrix {
    let rows = candidates
        .iter()
        .map(|(name, metadata)| {
            let has: Vec<bool> = skills
                .iter()
                .map(|skill| {
                    let skill_lower = skill.to_lowercase();
                    metadata.skills.iter().any(|s| s.to_lowercase().contains(&skill_lower))
                })
                .collect();
            (name.clone(), has)
        })
        .collect();
    SkillMatrix {
        skills: skills.to_vec(),
        rows,
    }
}

/// How many candidates in the session have each skill, sorted by frequency
/// descending — "what does this talent pool look like?".
pub fn distribution(candidates: &[EnrichedMetadata]) -> Vec<(String, u32)> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for metadata in candidates {
        for skill in &metadata.skills {
            *counts.entry(skill.clone()).or_insert(0) += 1;
        }
    }
    let mut counted: Vec<(String, u32)> = counts.into_iter().collect();
    counted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counted
}

/// Which of `required_skills` has zero coverage across the session, i.e.
/// no candidate holds it at all.
pub fn uncovered(candidates: &[EnrichedMetadata], required_skills: &[String]) -> Vec<String> {
    required_skills
        .iter()
        .filter(|skill| {
            let skill_lower = skill.to_lowercase();
            !candidates
                .iter()
                .any(|m| m.skills.iter().any(|s| s.to_lowercase().contains(&skill_lower)))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_marks_present_skills() {
        let candidates = vec![(
            "Jane".to_string(),
            EnrichedMetadata {
                skills: vec!["rust".to_string()],
                ..Default::default()
            },
        )];
        let matrix = build_matrix(&candidates, &["rust".to_string(), "go".to_string()]);
        assert_eq!(matrix.rows[0].1, vec![true, false]);
    }

    #[test]
    fn uncovered_skill_is_flagged() {
        let candidates = vec![EnrichedMetadata {
            skills: vec!["rust".to_string()],
            ..Default::default()
        }];
        let missing = uncovered(&candidates, &["rust".to_string(), "go".to_string()]);
        assert_eq!(missing, vec!["go".to_string()]);
    }
}
