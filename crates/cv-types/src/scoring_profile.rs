use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::metadata::EducationLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    SkillsMatch,
    Experience,
    Education,
    Relevance,
    Certifications,
    Languages,
    Location,
    CulturalFit,
    Custom,
}

/// A weighted scoring configuration (C14). Weights are normalized to sum
/// to `1.0` at construction time (spec invariant, §8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub id: String,
    weights: HashMap<Criterion, f32>,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub min_experience_years: f32,
    pub ideal_experience_years: f32,
    pub required_education: Option<EducationLevel>,
    pub preferred_locations: Vec<String>,
}

impl ScoringProfile {
    pub fn new(id: impl Into<String>, weights: HashMap<Criterion, f32>) -> Self {
        let mut profile = Self {
            id: id.into(),
            weights,
            required_skills: Vec::new(),
            preferred_skills: Vec::new(),
            min_experience_years: 0.0,
            ideal_experience_years: 0.0,
            required_education: None,
            preferred_locations: Vec::new(),
        };
        profile.normalize_weights();
        profile
    }

    fn normalize_weights(&mut self) {
        let total: f32 = self.weights.values().sum();
        if total > 0.0 {
            for w in self.weights.values_mut() {
                *w /= total;
            }
        }
    }

    pub fn weight(&self, criterion: Criterion) -> f32 {
        self.weights.get(&criterion).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &HashMap<Criterion, f32> {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_normalize_to_one() {
        let mut weights = HashMap::new();
        weights.insert(Criterion::Experience, 3.0);
        weights.insert(Criterion::SkillsMatch, 1.0);
        let profile = ScoringProfile::new("p1", weights);
        let sum: f32 = profile.weights().values().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!((profile.weight(Criterion::Experience) - 0.75).abs() < 1e-6);
    }
}
