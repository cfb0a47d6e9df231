//! Verdict module — derives a categorical verdict from the verifier's
//! (C9) [`VerificationInfo`], for the verification structure's
//! conflict-fixer (spec §9: computed values win over LLM prose).
//!
//! Grounded on `original_source/.../verdict_module.py`.

use cv_types::VerificationInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Verdict {
    Confirmed,
    Partial,
    NotFound,
    Contradicted,
}

/// `combined_confidence < 0.3` with ungrounded claims reads as
/// contradicted; a `None` groundedness (nothing retrieved to check
/// against) with zero verified claims reads as not found; otherwise
/// confirmed/partial on the confidence split.
pub fn derive(info: &VerificationInfo) -> Verdict {
    if !info.ungrounded_claims.is_empty() && info.combined_confidence < 0.3 {
        return Verdict::Contradicted;
    }
    if info.verified_claims.is_empty() && info.groundedness.is_none() {
        return Verdict::NotFound;
    }
    if info.combined_confidence >= 0.7 {
        Verdict::Confirmed
    } else {
        Verdict::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(combined_confidence: f32, verified: Vec<&str>, ungrounded: Vec<&str>, groundedness: Option<f32>) -> VerificationInfo {
        VerificationInfo {
            groundedness,
            verified_claims: verified.into_iter().map(String::from).collect(),
            ungrounded_claims: ungrounded.into_iter().map(String::from).collect(),
            heuristic_confidence: combined_confidence,
            unverified_cv_ids: Vec::new(),
            combined_confidence,
            warning: None,
        }
    }

    #[test]
    fn low_confidence_with_ungrounded_claims_is_contradicted() {
        let verdict = derive(&info(0.1, vec![], vec!["claim"], Some(0.1)));
        assert_eq!(verdict, Verdict::Contradicted);
    }

    #[test]
    fn nothing_verified_and_no_groundedness_is_not_found() {
        let verdict = derive(&info(0.5, vec![], vec![], None));
        assert_eq!(verdict, Verdict::NotFound);
    }

    #[test]
    fn high_confidence_is_confirmed() {
        let verdict = derive(&info(0.9, vec!["claim"], vec![], Some(0.9)));
        assert_eq!(verdict, Verdict::Confirmed);
    }
}
