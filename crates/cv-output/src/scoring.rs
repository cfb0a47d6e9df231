//! Candidate Scoring Service (C14)
//!
//! Turns an [`EnrichedMetadata`] plus a [`ScoringProfile`] into a weighted,
//! explainable score: one raw `0..=100` figure per criterion, a normalized
//! weighted overall, a letter grade, and top strengths/weaknesses.
//! Grounded on `original_source/candidate_scoring_service.py`.

use std::collections::HashMap;

use cv_types::{Criterion, EnrichedMetadata, ScoringProfile};

use crate::error::{OutputError, OutputResult};

/// Default weights for a generic (no explicit profile) scoring pass:
/// skills .35, experience .25, relevance .20, education .10,
/// certifications .05, languages .05. `location`/`cultural_fit`/`custom`
/// default to zero and only contribute when a caller-built profile sets them.
pub fn default_weights() -> HashMap<Criterion, f32> {
    let mut weights = HashMap::new();
    weights.insert(Criterion::SkillsMatch, 0.35);
    weights.insert(Criterion::Experience, 0.25);
    weights.insert(Criterion::Relevance, 0.20);
    weights.insert(Criterion::Education, 0.10);
    weights.insert(Criterion::Certifications, 0.05);
    weights.insert(Criterion::Languages, 0.05);
    weights
}

pub fn default_profile() -> ScoringProfile {
    ScoringProfile::new("default", default_weights())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_overall(overall: f32) -> Self {
        if overall >= 90.0 {
            Grade::A
        } else if overall >= 80.0 {
            Grade::B
        } else if overall >= 70.0 {
            Grade::C
        } else if overall >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Grade::A => "Excellent fit. Recommend moving directly to an interview.",
            Grade::B => "Strong fit. Worth a screening call to confirm the gaps noted below.",
            Grade::C => {
                "Moderate fit. Consider only if the role has flexibility on the weaker criteria."
            }
            Grade::D => "Weak fit. Likely not a match without significant upskilling or scope change.",
            Grade::F => "Poor fit. Not recommended for this role as specified.",
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CriterionScore {
    pub criterion: Criterion,
    pub raw_score: f32,
    pub weight: f32,
    pub weighted: f32,
    pub explanation: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CandidateScore {
    pub cv_id: String,
    pub candidate_name: String,
    pub overall: f32,
    pub grade: Grade,
    pub criteria: Vec<CriterionScore>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: String,
}

const ALL_CRITERIA: [Criterion; 9] = [
    Criterion::SkillsMatch,
    Criterion::Experience,
    Criterion::Education,
    Criterion::Relevance,
    Criterion::Certifications,
    Criterion::Languages,
    Criterion::Location,
    Criterion::CulturalFit,
    Criterion::Custom,
];

pub struct ScoringService;

impl ScoringService {
    /// Scores one candidate against `profile`. `requirements` are the
    /// free-text requirement strings query understanding (C4) extracted —
    /// used by the relevance criterion for a requirement/skill overlap.
    pub fn score(
        cv_id: impl Into<String>,
        candidate_name: impl Into<String>,
        metadata: &EnrichedMetadata,
        profile: &ScoringProfile,
        requirements: &[String],
    ) -> OutputResult<CandidateScore> {
        let active: Vec<Criterion> = ALL_CRITERIA
            .into_iter()
            .filter(|c| profile.weight(*c) > 0.0)
            .collect();
        if active.is_empty() {
            return Err(OutputError::EmptyScoringProfile);
        }

        let mut criteria = Vec::with_capacity(active.len());
        let mut overall = 0.0f32;
        for criterion in active {
            let weight = profile.weight(criterion);
            let (raw_score, explanation) = score_criterion(criterion, metadata, profile, requirements);
            let weighted = raw_score * weight;
            overall += weighted;
            criteria.push(CriterionScore {
                criterion,
                raw_score,
                weight,
                weighted,
                explanation,
            });
        }

        let overall = overall.clamp(0.0, 100.0);
        let grade = Grade::from_overall(overall);

        let mut by_strength = criteria.clone();
        by_strength.sort_by(|a, b| b.raw_score.partial_cmp(&a.raw_score).unwrap_or(std::cmp::Ordering::Equal));
        let strengths = by_strength
            .iter()
            .filter(|c| c.raw_score >= 80.0)
            .take(3)
            .map(|c| c.explanation.clone())
            .collect();

        let mut by_weakness = criteria.clone();
        by_weakness.sort_by(|a, b| a.raw_score.partial_cmp(&b.raw_score).unwrap_or(std::cmp::Ordering::Equal));
        let weaknesses = by_weakness
            .iter()
            .filter(|c| c.raw_score < 60.0)
            .take(3)
            .map(|c| c.explanation.clone())
            .collect();

        Ok(CandidateScore {
            cv_id: cv_id.into(),
            candidate_name: candidate_name.into(),
            overall,
            grade,
            criteria,
            strengths,
            weaknesses,
            recommendation: grade.recommendation().to_string(),
        })
    }
}

fn score_criterion(
    criterion: Criterion,
    metadata: &EnrichedMetadata,
    profile: &ScoringProfile,
    requirements: &[String],
) -> (f32, String) {
    match criterion {
        Criterion::SkillsMatch => {
            if profile.required_skills.is_empty() {
                let score = (metadata.skills.len() as f32 / 10.0 * 100.0).min(100.0);
                (score, format!("{} skills listed", metadata.skills.len()))
            } else {
                let matched = profile
                    .required_skills
                    .iter()
                    .filter(|req| has_skill(metadata, req))
                    .count();
                let score = matched as f32 / profile.required_skills.len() as f32 * 100.0;
                (
                    score,
                    format!("matches {}/{} required skills", matched, profile.required_skills.len()),
                )
            }
        }
        Criterion::Experience => {
            let years = metadata.total_experience_years;
            let score = if profile.ideal_experience_years > 0.0 {
                (years / profile.ideal_experience_years * 100.0).min(100.0)
            } else {
                (years / 10.0 * 100.0).min(100.0)
            };
            let score = if years < profile.min_experience_years {
                score.min(59.0)
            } else {
                score
            };
            (score, format!("{:.1} years of experience", years))
        }
        Criterion::Education => {
            let score = match (metadata.education_level, profile.required_education) {
                (Some(have), Some(required)) if education_rank(have) >= education_rank(required) => 100.0,
                (Some(have), Some(required)) => {
                    60.0 * education_rank(have) as f32 / education_rank(required).max(1) as f32
                }
                (Some(_), None) => 85.0,
                (None, _) => 40.0,
            };
            let label = metadata
                .education_level
                .map(|l| format!("{l:?}"))
                .unwrap_or_else(|| "unspecified education".to_string());
            (score, label)
        }
        Criterion::Relevance => {
            if requirements.is_empty() && profile.preferred_skills.is_empty() {
                (70.0, "no explicit requirements to compare against".to_string())
            } else {
                let total = requirements.len() + profile.preferred_skills.len();
                let matched = requirements
                    .iter()
                    .chain(profile.preferred_skills.iter())
                    .filter(|req| has_skill(metadata, req))
                    .count();
                let score = if total > 0 {
                    matched as f32 / total as f32 * 100.0
                } else {
                    70.0
                };
                (score, format!("relevant to {}/{} stated requirements", matched, total))
            }
        }
        Criterion::Certifications => {
            let score = (metadata.certifications.len() as f32 / 3.0 * 100.0).min(100.0);
            (score, format!("{} certifications", metadata.certifications.len()))
        }
        Criterion::Languages => {
            let score = (metadata.languages.len() as f32 / 2.0 * 100.0).min(100.0);
            (score, format!("speaks {} language(s)", metadata.languages.len()))
        }
        Criterion::Location => {
            let score = match &metadata.location {
                Some(loc) if profile.preferred_locations.iter().any(|p| p.eq_ignore_ascii_case(loc)) => 100.0,
                Some(_) => 40.0,
                None => 50.0,
            };
            (score, metadata.location.clone().unwrap_or_else(|| "location unknown".to_string()))
        }
        Criterion::CulturalFit => (70.0, "no cultural-fit signal available".to_string()),
        Criterion::Custom => (70.0, "custom criterion not configured".to_string()),
    }
}

fn has_skill(metadata: &EnrichedMetadata, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    metadata.skills.iter().any(|s| s.to_lowercase().contains(&needle))
        || metadata
            .current_role
            .as_ref()
            .is_some_and(|r| r.to_lowercase().contains(&needle))
}

fn education_rank(level: cv_types::EducationLevel) -> u8 {
    use cv_types::EducationLevel::*;
    match level {
        HighSchool => 1,
        Associate => 2,
        Bachelor => 3,
        Master => 4,
        Doctorate => 5,
        Other => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> EnrichedMetadata {
        EnrichedMetadata {
            total_experience_years: 9.0,
            skills: vec!["rust".into(), "postgres".into(), "kubernetes".into()],
            certifications: vec!["AWS Solutions Architect".into()],
            languages: vec!["English".into(), "Spanish".into()],
            education_level: Some(cv_types::EducationLevel::Bachelor),
            ..Default::default()
        }
    }

    #[test]
    fn grade_cutoffs() {
        assert_eq!(Grade::from_overall(95.0), Grade::A);
        assert_eq!(Grade::from_overall(85.0), Grade::B);
        assert_eq!(Grade::from_overall(75.0), Grade::C);
        assert_eq!(Grade::from_overall(65.0), Grade::D);
        assert_eq!(Grade::from_overall(40.0), Grade::F);
    }

    #[test]
    fn scores_with_required_skills() {
        let mut profile = default_profile();
        profile.required_skills = vec!["rust".into(), "go".into()];
        let score = ScoringService::score("cv1", "Jane Doe", &meta(), &profile, &[]).unwrap();
        assert!(score.overall > 0.0 && score.overall <= 100.0);
        assert!(!score.criteria.is_empty());
    }

    #[test]
    fn empty_profile_errors() {
        let profile = ScoringProfile::new("empty", HashMap::new());
        let result = ScoringService::score("cv1", "Jane Doe", &meta(), &profile, &[]);
        assert!(result.is_err());
    }

    #[test]
    fn strengths_and_weaknesses_are_populated() {
        let profile = default_profile();
        let score = ScoringService::score("cv1", "Jane Doe", &meta(), &profile, &["rust".to_string()]).unwrap();
        assert!(score.overall > 0.0);
        // with strong skills/experience, at least one strength is expected
        assert!(!score.strengths.is_empty() || !score.weaknesses.is_empty());
    }
}
