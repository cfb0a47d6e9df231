//! Top-pick module — picks the single best candidate from a scored or
//! ranked set. Computed, never trusted from LLM prose (spec §9: computed
//! data wins over LLM-asserted conclusions).
//!
//! Grounded on `original_source/.../top_pick_module.py`.

use crate::scoring::CandidateScore;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TopPick {
    pub cv_id: String,
    pub candidate_name: String,
    pub overall_score: f32,
    pub reason: String,
}

/// The highest-`overall` candidate. Returns `None` for an empty slice.
pub fn pick(scores: &[CandidateScore]) -> Option<TopPick> {
    let best = scores
        .iter()
        .max_by(|a, b| a.overall.partial_cmp(&b.overall).unwrap_or(std::cmp::Ordering::Equal))?;
    let reason = best
        .strengths
        .first()
        .cloned()
        .unwrap_or_else(|| format!("highest overall score ({:.0})", best.overall));
    Some(TopPick {
        cv_id: best.cv_id.clone(),
        candidate_name: best.candidate_name.clone(),
        overall_score: best.overall,
        reason,
    })
}

/// The top row of a ranking table. Ranking's own table is already sorted
/// by `overall` descending (`rank == 1` first), so this is the table's
/// actual winner rather than an independently re-scored candidate — the
/// two must never disagree (spec §8).
pub fn pick_from_ranked(ranked: &[crate::modules::ranking::RankedCandidate]) -> Option<TopPick> {
    let best = ranked.iter().max_by(|a, b| a.overall.partial_cmp(&b.overall).unwrap_or(std::cmp::Ordering::Equal))?;
    let reason = best
        .strengths
        .first()
        .cloned()
        .unwrap_or_else(|| format!("highest overall score ({:.0})", best.overall));
    Some(TopPick {
        cv_id: best.cv_id.clone(),
        candidate_name: best.candidate_name.clone(),
        overall_score: best.overall,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Grade;

    fn score(name: &str, overall: f32) -> CandidateScore {
        CandidateScore {
            cv_id: name.to_string(),
            candidate_name: name.to_string(),
            overall,
            grade: Grade::from_overall(overall),
            criteria: Vec::new(),
            strengths: vec!["strong overall".to_string()],
            weaknesses: Vec::new(),
            recommendation: String::new(),
        }
    }

    #[test]
    fn picks_highest_overall() {
        let scores = vec![score("a", 70.0), score("b", 95.0)];
        let pick = pick(&scores).unwrap();
        assert_eq!(pick.candidate_name, "b");
    }

    #[test]
    fn empty_input_returns_none() {
        assert!(pick(&[]).is_none());
    }

    #[test]
    fn pick_from_ranked_matches_the_ranking_tables_max_overall() {
        use crate::modules::ranking::RankedCandidate;

        let ranked = vec![
            RankedCandidate {
                cv_id: "cv1".to_string(),
                candidate_name: "Low".to_string(),
                per_criterion: Vec::new(),
                overall: 40.0,
                rank: 2,
                strengths: Vec::new(),
                weaknesses: Vec::new(),
            },
            RankedCandidate {
                cv_id: "cv2".to_string(),
                candidate_name: "High".to_string(),
                per_criterion: Vec::new(),
                overall: 95.0,
                rank: 1,
                strengths: Vec::new(),
                weaknesses: Vec::new(),
            },
        ];
        let pick = pick_from_ranked(&ranked).unwrap();
        assert_eq!(pick.candidate_name, "High");
        assert_eq!(pick.overall_score, 95.0);
    }

    #[test]
    fn pick_from_ranked_empty_input_returns_none() {
        assert!(pick_from_ranked(&[]).is_none());
    }
}
