//! Enriched, CV-wide metadata attached to every chunk of a CV.
//!
//! Identical across all chunks of one CV (spec invariant). Modeled as a
//! typed struct with an `extra` escape hatch rather than an untyped map —
//! downstream code reads through the typed accessors below instead of
//! duck-typing a dictionary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seniority {
    Junior,
    Entry,
    Mid,
    Senior,
    Principal,
}

impl Seniority {
    /// Maps years of experience and a job-title hint onto a seniority band.
    /// Thresholds per `SPEC_FULL.md` §3 / `original_source/smart_chunking_service.py`:
    /// junior <1y, entry <4y, mid <8y, senior <12y, principal >=12y.
    pub fn from_years(years: f32) -> Self {
        if years < 1.0 {
            Seniority::Junior
        } else if years < 4.0 {
            Seniority::Entry
        } else if years < 8.0 {
            Seniority::Mid
        } else if years < 12.0 {
            Seniority::Senior
        } else {
            Seniority::Principal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationLevel {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedMetadata {
    pub total_experience_years: f32,
    pub position_experience_years: Vec<(String, f32)>,
    pub position_count: u32,
    pub current_role: Option<String>,
    pub current_company: Option<String>,
    pub seniority: Seniority,
    pub job_hopping_score: f32,
    pub avg_tenure_years: f32,
    pub employment_gap_count: u32,
    pub is_faang: bool,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub education_level: Option<EducationLevel>,
    pub education_field: Option<String>,
    pub education_institution: Option<String>,
    pub graduation_year: Option<u16>,
    pub certifications: Vec<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub hobbies: Vec<String>,
    /// Set when `total_experience_years` came from the undated-position
    /// fallback heuristic rather than dated positions.
    pub estimated_total_experience: bool,
    /// Escape hatch for scalar values that don't warrant a dedicated field
    /// (e.g. `speaks_french`, `has_aws_cert`). Read through
    /// [`EnrichedMetadata::flag`] rather than indexing directly.
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for EnrichedMetadata {
    fn default() -> Self {
        Self {
            total_experience_years: 0.0,
            position_experience_years: Vec::new(),
            position_count: 0,
            current_role: None,
            current_company: None,
            seniority: Seniority::Entry,
            job_hopping_score: 0.0,
            avg_tenure_years: 0.0,
            employment_gap_count: 0,
            is_faang: false,
            skills: Vec::new(),
            languages: Vec::new(),
            education_level: None,
            education_field: None,
            education_institution: None,
            graduation_year: None,
            certifications: Vec::new(),
            location: None,
            linkedin_url: None,
            github_url: None,
            portfolio_url: None,
            hobbies: Vec::new(),
            estimated_total_experience: false,
            extra: HashMap::new(),
        }
    }
}

impl EnrichedMetadata {
    /// Typed accessor for a boolean flag stashed in `extra`
    /// (e.g. `speaks_french`, `has_aws_cert`).
    pub fn flag(&self, key: &str) -> bool {
        self.extra
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.extra.insert(key.into(), serde_json::Value::Bool(value));
    }

    /// Convenience: `speaks_<language>` flags derived from `languages`.
    pub fn speaks(&self, language: &str) -> bool {
        self.languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }

    /// Convenience: does the candidate hold a certification containing
    /// `needle` (case-insensitive substring, e.g. "aws")?
    pub fn has_certification(&self, needle: &str) -> bool {
        self.certifications
            .iter()
            .any(|c| c.to_lowercase().contains(&needle.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seniority_bands() {
        assert_eq!(Seniority::from_years(0.5), Seniority::Junior);
        assert_eq!(Seniority::from_years(2.0), Seniority::Entry);
        assert_eq!(Seniority::from_years(6.0), Seniority::Mid);
        assert_eq!(Seniority::from_years(10.0), Seniority::Senior);
        assert_eq!(Seniority::from_years(15.0), Seniority::Principal);
    }

    #[test]
    fn flag_roundtrip() {
        let mut meta = EnrichedMetadata::default();
        assert!(!meta.flag("has_aws_cert"));
        meta.set_flag("has_aws_cert", true);
        assert!(meta.flag("has_aws_cert"));
    }

    #[test]
    fn speaks_is_case_insensitive() {
        let mut meta = EnrichedMetadata::default();
        meta.languages.push("French".to_string());
        assert!(meta.speaks("french"));
        assert!(!meta.speaks("german"));
    }
}
