//! Team-build modules: composition summary, synergy, team-level risk and
//! per-member cards.
//!
//! Grounded on `original_source/.../team_composition_module.py`,
//! `team_synergy_module.py`, `team_risk_module.py` and
//! `team_member_cards_module.py`.

use cv_types::EnrichedMetadata;

use crate::modules::risk::{self, RiskLevel};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TeamComposition {
    pub size: usize,
    pub seniority_breakdown: Vec<(String, u32)>,
    pub combined_skills: Vec<String>,
    pub avg_experience_years: f32,
}

pub fn composition(candidates: &[EnrichedMetadata]) -> TeamComposition {
    use std::collections::HashMap;
    let mut seniority_counts: HashMap<String, u32> = HashMap::new();
    let mut skills: Vec<String> = Vec::new();
    let mut total_years = 0.0;

    for metadata in candidates {
        *seniority_counts.entry(format!("{:?}", metadata.seniority)).or_insert(0) += 1;
        for skill in &metadata.skills {
            if !skills.contains(skill) {
                skills.push(skill.clone());
            }
        }
        total_years += metadata.total_experience_years;
    }

    let mut seniority_breakdown: Vec<(String, u32)> = seniority_counts.into_iter().collect();
    seniority_breakdown.sort_by(|a, b| b.1.cmp(&a.1));

    TeamComposition {
        size: candidates.len(),
        seniority_breakdown,
        combined_skills: skills,
        avg_experience_years: if candidates.is_empty() {
            0.0
        } else {
            total_years / candidates.len() as f32
        },
    }
}

/// Overlapping vs. complementary skill coverage across the proposed team:
/// higher `overlap_ratio` means more redundancy, lower means better
/// skill-gap coverage per head.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TeamSynergy {
    pub unique_skill_count: usize,
    pub total_skill_mentions: usize,
    pub overlap_ratio: f32,
    pub narrative: String,
}

pub fn synergy(candidates: &[EnrichedMetadata]) -> TeamSynergy {
    use std::collections::HashSet;
    let mut unique: HashSet<String> = HashSet::new();
    let mut total_mentions = 0usize;
    for metadata in candidates {
        for skill in &metadata.skills {
            unique.insert(skill.to_lowercase());
            total_mentions += 1;
        }
    }
    let overlap_ratio = if unique.is_empty() {
        0.0
    } else {
        1.0 - (unique.len() as f32 / total_mentions.max(1) as f32)
    };
    let narrative = if overlap_ratio > 0.5 {
        "Significant skill overlap — the team leans redundant rather than complementary.".to_string()
    } else {
        "Skills are largely complementary across the proposed team.".to_string()
    };
    TeamSynergy {
        unique_skill_count: unique.len(),
        total_skill_mentions: total_mentions,
        overlap_ratio,
        narrative,
    }
}

/// The team-level risk is the worst individual risk level among members,
/// plus a roster of who carries it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TeamRisk {
    pub overall: RiskLevel,
    pub flagged_members: Vec<String>,
}

pub fn team_risk(candidates: &[(String, EnrichedMetadata)]) -> TeamRisk {
    let assessments: Vec<_> = candidates
        .iter()
        .map(|(name, metadata)| (name.clone(), risk::assess("", name.clone(), metadata)))
        .collect();
    let overall = assessments
        .iter()
        .map(|(_, a)| a.overall)
        .max()
        .unwrap_or(RiskLevel::Low);
    let flagged_members = assessments
        .into_iter()
        .filter(|(_, a)| a.overall != RiskLevel::Low)
        .map(|(name, _)| name)
        .collect();
    TeamRisk { overall, flagged_members }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MemberCard {
    pub candidate_name: String,
    pub role_on_team: String,
    pub top_skills: Vec<String>,
    pub years_experience: f32,
}

pub fn member_cards(candidates: &[(String, EnrichedMetadata)]) -> Vec<MemberCard> {
    candidates
        .iter()
        .map(|(name, metadata)| MemberCard {
            candidate_name: name.clone(),
            role_on_team: metadata.current_role.clone().unwrap_or_else(|| "Contributor".to_string()),
            top_skills: metadata.skills.iter().take(5).cloned().collect(),
            years_experience: metadata.total_experience_years,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_averages_experience() {
        let candidates = vec![
            EnrichedMetadata { total_experience_years: 4.0, ..Default::default() },
            EnrichedMetadata { total_experience_years: 8.0, ..Default::default() },
        ];
        let comp = composition(&candidates);
        assert_eq!(comp.size, 2);
        assert!((comp.avg_experience_years - 6.0).abs() < 1e-6);
    }

    #[test]
    fn team_risk_takes_worst_member() {
        let risky = EnrichedMetadata { job_hopping_score: 0.9, avg_tenure_years: 0.5, employment_gap_count: 3, ..Default::default() };
        let safe = EnrichedMetadata::default();
        let candidates = vec![("Risky".to_string(), risky), ("Safe".to_string(), safe)];
        let result = team_risk(&candidates);
        assert_eq!(result.overall, RiskLevel::High);
        assert_eq!(result.flagged_members, vec!["Risky".to_string()]);
    }
}
