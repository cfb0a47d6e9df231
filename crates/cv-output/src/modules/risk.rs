//! Risk table module — red flags, job hopping, employment gaps, tenure
//! stability and experience level, per candidate.
//!
//! Grounded on `original_source/.../risk_table_module.py`: same five
//! factors and the same tenure/job-hopping thresholds.

use cv_types::EnrichedMetadata;

/// `job_hopping_score <= LOW` is considered stable; above `MODERATE` is high risk.
pub const JOB_HOPPING_LOW: f32 = 0.3;
pub const JOB_HOPPING_MODERATE: f32 = 0.5;
/// Average tenure below this many years raises a stability concern.
pub const TENURE_CONCERN_YEARS: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub level: RiskLevel,
    pub detail: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RiskAssessment {
    pub cv_id: String,
    pub candidate_name: String,
    pub factors: Vec<RiskFactor>,
    pub overall: RiskLevel,
    pub narrative: String,
}

pub fn assess(cv_id: impl Into<String>, candidate_name: impl Into<String>, metadata: &EnrichedMetadata) -> RiskAssessment {
    let candidate_name = candidate_name.into();
    let cv_id = cv_id.into();

    let red_flags = RiskFactor {
        name: "Red Flags".to_string(),
        level: if metadata.employment_gap_count > 2 {
            RiskLevel::High
        } else if metadata.employment_gap_count > 0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        },
        detail: format!("{} employment gap(s) on record", metadata.employment_gap_count),
    };

    let job_hopping = RiskFactor {
        name: "Job Hopping".to_string(),
        level: if metadata.job_hopping_score <= JOB_HOPPING_LOW {
            RiskLevel::Low
        } else if metadata.job_hopping_score <= JOB_HOPPING_MODERATE {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        },
        detail: format!("job-hopping score {:.2}", metadata.job_hopping_score),
    };

    let employment_gaps = RiskFactor {
        name: "Employment Gaps".to_string(),
        level: match metadata.employment_gap_count {
            0 => RiskLevel::Low,
            1 => RiskLevel::Moderate,
            _ => RiskLevel::High,
        },
        detail: format!("{} gap(s) > 1 year", metadata.employment_gap_count),
    };

    let stability = RiskFactor {
        name: "Stability".to_string(),
        level: if metadata.avg_tenure_years < TENURE_CONCERN_YEARS {
            RiskLevel::High
        } else if metadata.avg_tenure_years < 2.5 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        },
        detail: format!("average tenure {:.1} years", metadata.avg_tenure_years),
    };

    let experience_level = RiskFactor {
        name: "Experience Level".to_string(),
        level: RiskLevel::Low,
        detail: format!("{:?} seniority, {:.1} years total", metadata.seniority, metadata.total_experience_years),
    };

    let factors = vec![red_flags, job_hopping, employment_gaps, stability, experience_level];
    let overall = factors
        .iter()
        .map(|f| f.level)
        .max()
        .unwrap_or(RiskLevel::Low);
    let narrative = narrative_for(overall, &factors);

    RiskAssessment {
        cv_id,
        candidate_name,
        factors,
        overall,
        narrative,
    }
}

fn narrative_for(overall: RiskLevel, factors: &[RiskFactor]) -> String {
    let concerning: Vec<&str> = factors
        .iter()
        .filter(|f| f.level != RiskLevel::Low)
        .map(|f| f.name.as_str())
        .collect();
    match overall {
        RiskLevel::Low => "No significant risk factors identified.".to_string(),
        RiskLevel::Moderate => format!("Some risk factors worth a closer look: {}.", concerning.join(", ")),
        RiskLevel::High => format!(
            "Elevated risk: {}. Recommend discussing these directly before proceeding.",
            concerning.join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_candidate_is_low_risk() {
        let metadata = EnrichedMetadata {
            job_hopping_score: 0.1,
            avg_tenure_years: 4.0,
            employment_gap_count: 0,
            ..Default::default()
        };
        let assessment = assess("cv1", "Jane", &metadata);
        assert_eq!(assessment.overall, RiskLevel::Low);
    }

    #[test]
    fn frequent_job_changes_raise_risk() {
        let metadata = EnrichedMetadata {
            job_hopping_score: 0.8,
            avg_tenure_years: 0.7,
            employment_gap_count: 3,
            ..Default::default()
        };
        let assessment = assess("cv1", "Jane", &metadata);
        assert_eq!(assessment.overall, RiskLevel::High);
    }
}
