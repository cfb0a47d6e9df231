//! Ranking-table module — scores candidates against free-text criterion
//! names (as stated by the LLM or the user, not the typed `Criterion`
//! enum), producing a ranked, weighted table with per-criterion
//! strengths/weaknesses and a markdown rendering.
//!
//! Grounded on `original_source/.../ranking_table_module.py`: criterion
//! names are substring-matched (`"experience"`, `"skill"`/`"technical"`,
//! `"stability"`, `"tenure"`, `"seniority"`, `"trajectory"`/`"career"`,
//! `"fit"`/`"role"`) rather than typed, since they come from free text.
//! Each name maps to its own formula — `stability` and `tenure` are not
//! the same criterion, and `trajectory` (a bell curve around 0.4
//! positions/year) is not the same as `fit` (half experience, half
//! skills).

use cv_types::{EnrichedMetadata, Seniority};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RankingCriterion {
    pub name: String,
    pub weight: f32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RankedCandidate {
    pub cv_id: String,
    pub candidate_name: String,
    pub per_criterion: Vec<(String, f32)>,
    pub overall: f32,
    pub rank: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Scores one free-text-named criterion against a candidate's metadata.
/// Unrecognized criterion names fall back to a neutral `70.0`.
pub fn score_named_criterion(name: &str, metadata: &EnrichedMetadata) -> f32 {
    let lower = name.to_lowercase();
    if lower.contains("experience") {
        experience_score(metadata)
    } else if lower.contains("skill") || lower.contains("technical") {
        skill_score(metadata)
    } else if lower.contains("stability") {
        stability_score(metadata)
    } else if lower.contains("tenure") {
        tenure_score(metadata)
    } else if lower.contains("seniority") {
        seniority_score(metadata.seniority)
    } else if lower.contains("trajectory") || lower.contains("career") {
        trajectory_score(metadata)
    } else if lower.contains("fit") || lower.contains("role") {
        fit_score(metadata)
    } else {
        70.0
    }
}

/// Experience linear to 100 at 10 years (spec §4.10).
fn experience_score(metadata: &EnrichedMetadata) -> f32 {
    (metadata.total_experience_years / 10.0 * 100.0).min(100.0)
}

/// Skills linear to 100 at 8 skills (spec §4.10; original `skill_count·12`).
fn skill_score(metadata: &EnrichedMetadata) -> f32 {
    (metadata.skills.len() as f32 * 12.0).min(100.0)
}

/// `stability = 100 − 100·job_hopping_score` (spec §4.10).
fn stability_score(metadata: &EnrichedMetadata) -> f32 {
    (100.0 - 100.0 * metadata.job_hopping_score).max(0.0)
}

/// Tenure linear to 100 at 4 years (spec §4.10).
fn tenure_score(metadata: &EnrichedMetadata) -> f32 {
    (metadata.avg_tenure_years * 25.0).min(100.0)
}

fn seniority_score(seniority: Seniority) -> f32 {
    match seniority {
        Seniority::Junior => 0.0,
        Seniority::Entry => 25.0,
        Seniority::Mid => 50.0,
        Seniority::Senior => 75.0,
        Seniority::Principal => 100.0,
    }
}

/// Career-trajectory: a bell curve around 0.4 positions/year, floored at
/// 30 (spec §4.10). Undated candidates (no experience years) score neutral.
fn trajectory_score(metadata: &EnrichedMetadata) -> f32 {
    if metadata.total_experience_years <= 0.0 {
        return 70.0;
    }
    let positions_per_year = metadata.position_count as f32 / metadata.total_experience_years;
    (100.0 - (positions_per_year - 0.4).abs() * 100.0).max(30.0).min(100.0)
}

/// Role fit: half experience, half skills (spec §4.10 / original
/// `exp_factor·50 + skill_factor·50`).
fn fit_score(metadata: &EnrichedMetadata) -> f32 {
    experience_score(metadata) * 0.5 + skill_score(metadata) * 0.5
}

/// Ranks `candidates` (cv_id, name, metadata) against weighted `criteria`.
/// Overall is the weight-normalized sum of per-criterion scores; rank `1`
/// is the highest overall.
pub fn rank_candidates(
    candidates: &[(String, String, EnrichedMetadata)],
    criteria: &[RankingCriterion],
) -> Vec<RankedCandidate> {
    let total_weight: f32 = criteria.iter().map(|c| c.weight).sum();
    let total_weight = if total_weight > 0.0 { total_weight } else { 1.0 };

    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .map(|(cv_id, name, metadata)| {
            let per_criterion: Vec<(String, f32)> = criteria
                .iter()
                .map(|c| (c.name.clone(), score_named_criterion(&c.name, metadata)))
                .collect();
            let overall = per_criterion
                .iter()
                .zip(criteria.iter())
                .map(|((_, score), c)| score * c.weight)
                .sum::<f32>()
                / total_weight;

            let mut sorted_desc = per_criterion.clone();
            sorted_desc.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            let strengths = sorted_desc
                .iter()
                .filter(|(_, s)| *s >= 70.0)
                .take(2)
                .map(|(n, _)| n.clone())
                .collect();

            let mut sorted_asc = per_criterion.clone();
            sorted_asc.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            let weaknesses = sorted_asc
                .iter()
                .filter(|(_, s)| *s < 50.0)
                .take(2)
                .map(|(n, _)| n.clone())
                .collect();

            RankedCandidate {
                cv_id: cv_id.clone(),
                candidate_name: name.clone(),
                per_criterion,
                overall,
                rank: 0,
                strengths,
                weaknesses,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.overall.partial_cmp(&a.overall).unwrap_or(std::cmp::Ordering::Equal));
    for (i, candidate) in ranked.iter_mut().enumerate() {
        candidate.rank = (i + 1) as u32;
    }
    ranked
}

/// Renders a ranked list as a markdown table: rank emoji, name, up to four
/// 8-char-truncated criterion columns, and the overall score.
pub fn render_markdown(ranked: &[RankedCandidate], criteria_names: &[String]) -> String {
    let shown: Vec<&String> = criteria_names.iter().take(4).collect();
    let mut out = String::from("| Rank | Candidate |");
    for name in &shown {
        out.push_str(&format!(" {} |", truncate8(name)));
    }
    out.push_str(" Overall |\n|---|---|");
    for _ in &shown {
        out.push_str("---|");
    }
    out.push_str("---|\n");

    for candidate in ranked {
        out.push_str(&format!("| {} | {} |", rank_emoji(candidate.rank), candidate.candidate_name));
        for name in &shown {
            let score = candidate
                .per_criterion
                .iter()
                .find(|(n, _)| n == *name)
                .map(|(_, s)| *s)
                .unwrap_or(0.0);
            out.push_str(&format!(" {:.0} |", score));
        }
        out.push_str(&format!(" {:.0} |\n", candidate.overall));
    }
    out
}

fn truncate8(name: &str) -> String {
    if name.len() <= 8 {
        name.to_string()
    } else {
        name.chars().take(8).collect()
    }
}

fn rank_emoji(rank: u32) -> String {
    match rank {
        1 => "🥇 1".to_string(),
        2 => "🥈 2".to_string(),
        3 => "🥉 3".to_string(),
        n => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_overall_descending() {
        let strong = EnrichedMetadata {
            total_experience_years: 10.0,
            skills: vec!["a".into(), "b".into(), "c".into()],
            ..Default::default()
        };
        let weak = EnrichedMetadata {
            total_experience_years: 1.0,
            ..Default::default()
        };
        let candidates = vec![
            ("cv1".to_string(), "Weak".to_string(), weak),
            ("cv2".to_string(), "Strong".to_string(), strong),
        ];
        let criteria = vec![RankingCriterion { name: "Experience".to_string(), weight: 1.0 }];
        let ranked = rank_candidates(&candidates, &criteria);
        assert_eq!(ranked[0].candidate_name, "Strong");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn stability_and_tenure_are_distinct_criteria() {
        let metadata = EnrichedMetadata { job_hopping_score: 0.3, avg_tenure_years: 2.0, ..Default::default() };
        assert_eq!(score_named_criterion("Stability", &metadata), 70.0);
        assert_eq!(score_named_criterion("Tenure", &metadata), 50.0);
    }

    #[test]
    fn trajectory_peaks_near_point_four_positions_per_year() {
        let ideal = EnrichedMetadata { position_count: 2, total_experience_years: 5.0, ..Default::default() };
        let erratic = EnrichedMetadata { position_count: 8, total_experience_years: 5.0, ..Default::default() };
        assert_eq!(score_named_criterion("Career Trajectory", &ideal), 100.0);
        assert!(score_named_criterion("Career Trajectory", &erratic) < 100.0);
    }

    #[test]
    fn fit_averages_experience_and_skills() {
        let metadata = EnrichedMetadata { total_experience_years: 10.0, skills: vec!["a".into(); 8], ..Default::default() };
        assert_eq!(score_named_criterion("Role Fit", &metadata), 100.0);
    }

    #[test]
    fn technical_is_recognized_as_a_skills_alias() {
        let metadata = EnrichedMetadata { skills: vec!["a".into(), "b".into()], ..Default::default() };
        assert_eq!(score_named_criterion("Technical", &metadata), score_named_criterion("Skills", &metadata));
    }

    #[test]
    fn five_candidate_experience_and_technical_ranking_matches_expected_order() {
        let years = [10.0, 8.0, 8.0, 3.0, 1.0];
        let skill_counts = [9, 8, 6, 3, 2];
        let candidates: Vec<(String, String, EnrichedMetadata)> = years
            .iter()
            .zip(skill_counts.iter())
            .enumerate()
            .map(|(i, (&exp, &n))| {
                let metadata = EnrichedMetadata {
                    total_experience_years: exp,
                    skills: (0..n).map(|s| format!("skill{s}")).collect(),
                    ..Default::default()
                };
                (format!("cv{}", i + 1), format!("Candidate {}", i + 1), metadata)
            })
            .collect();
        let criteria = vec![
            RankingCriterion { name: "experience".to_string(), weight: 0.5 },
            RankingCriterion { name: "technical".to_string(), weight: 0.5 },
        ];
        let ranked = rank_candidates(&candidates, &criteria);

        assert_eq!(ranked[0].cv_id, "cv1");
        assert!(ranked[0].overall >= 95.0);
        let order: Vec<u32> = ranked.iter().map(|c| c.rank).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
        let names: Vec<&str> = ranked.iter().map(|c| c.candidate_name.as_str()).collect();
        assert_eq!(names, vec!["Candidate 1", "Candidate 2", "Candidate 3", "Candidate 4", "Candidate 5"]);
    }

    #[test]
    fn markdown_includes_rank_emoji() {
        let candidates = vec![("cv1".to_string(), "Jane".to_string(), EnrichedMetadata::default())];
        let criteria = vec![RankingCriterion { name: "Experience".to_string(), weight: 1.0 }];
        let ranked = rank_candidates(&candidates, &criteria);
        let md = render_markdown(&ranked, &["Experience".to_string()]);
        assert!(md.contains("🥇"));
    }
}
