//! Match-score module — classifies each stated requirement against a
//! candidate's metadata as met/partial/missing and rolls that up into an
//! overall match percentage.
//!
//! Grounded on `original_source/.../match_score_module.py`:
//! `overall = (met + 0.5 * partial) / total * 100`.

use cv_types::EnrichedMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RequirementStatus {
    Met,
    Partial,
    Missing,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RequirementMatch {
    pub requirement: String,
    pub status: RequirementStatus,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MatchScoreResult {
    pub cv_id: String,
    pub candidate_name: String,
    pub requirements: Vec<RequirementMatch>,
    pub overall_percent: f32,
    pub strengths: Vec<String>,
}

pub fn match_requirements(
    cv_id: impl Into<String>,
    candidate_name: impl Into<String>,
    metadata: &EnrichedMetadata,
    requirements: &[String],
) -> MatchScoreResult {
    let candidate_name = candidate_name.into();
    let cv_id = cv_id.into();

    let requirement_matches: Vec<RequirementMatch> = requirements
        .iter()
        .map(|req| RequirementMatch {
            requirement: req.clone(),
            status: classify(req, metadata),
        })
        .collect();

    let met = requirement_matches.iter().filter(|r| r.status == RequirementStatus::Met).count();
    let partial = requirement_matches.iter().filter(|r| r.status == RequirementStatus::Partial).count();
    let total = requirement_matches.len().max(1);
    let overall_percent = (met as f32 + 0.5 * partial as f32) / total as f32 * 100.0;

    let mut strengths = Vec::new();
    if metadata.total_experience_years >= 8.0 {
        strengths.push(format!("extensive experience ({:.0} years)", metadata.total_experience_years));
    } else if metadata.total_experience_years >= 5.0 {
        strengths.push(format!("solid experience ({:.0} years)", metadata.total_experience_years));
    }
    if metadata.skills.len() >= 10 {
        strengths.push("broad skill set".to_string());
    }
    if met >= 5 {
        strengths.push("meets most stated requirements".to_string());
    }

    MatchScoreResult {
        cv_id,
        candidate_name,
        requirements: requirement_matches,
        overall_percent,
        strengths,
    }
}

fn classify(requirement: &str, metadata: &EnrichedMetadata) -> RequirementStatus {
    let needle = requirement.to_lowercase();
    let needle_words: Vec<&str> = needle.split_whitespace().collect();

    let exact = metadata.skills.iter().any(|s| s.to_lowercase() == needle)
        || metadata.skills.iter().any(|s| needle.contains(&s.to_lowercase()) && s.len() > 2);
    if exact {
        return RequirementStatus::Met;
    }

    let partial = metadata.skills.iter().any(|s| {
        let skill_lower = s.to_lowercase();
        needle_words.iter().any(|w| w.len() > 2 && skill_lower.contains(w))
    }) || metadata
        .current_role
        .as_ref()
        .is_some_and(|r| r.to_lowercase().contains(&needle));

    if partial {
        RequirementStatus::Partial
    } else {
        RequirementStatus::Missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_met_requirement_scores_100() {
        let metadata = EnrichedMetadata {
            skills: vec!["rust".to_string()],
            ..Default::default()
        };
        let result = match_requirements("cv1", "Jane", &metadata, &["rust".to_string()]);
        assert_eq!(result.overall_percent, 100.0);
    }

    #[test]
    fn missing_requirement_scores_0() {
        let metadata = EnrichedMetadata::default();
        let result = match_requirements("cv1", "Jane", &metadata, &["golang".to_string()]);
        assert_eq!(result.overall_percent, 0.0);
    }
}
