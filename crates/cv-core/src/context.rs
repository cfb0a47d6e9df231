//! Context Resolver (C3)
//!
//! Scans the most recent assistant message(s) for CV-reference patterns
//! ("top candidate", "él/ella", "the same person", ranking rows with
//! percentage scores, "Top Recommendation:" lines, explicit winner
//! phrases) and resolves them to a concrete `{name, cv_id}` pair, per the
//! "regex-heavy free text extraction" redesign flag (spec §9).

use once_cell::sync::Lazy;
use regex::Regex;

use cv_types::{Message, Role};

/// The kind of back-reference a query made, mirroring the reference
/// taxonomy in the CV-reference grounding source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceType {
    TopCandidate,
    TopCandidates,
    ThisCandidate,
    Pronoun,
    SameCandidate,
    PreviousResults,
    SeniorCandidate,
    RiskContext,
    None,
}

impl ReferenceType {
    fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::TopCandidate => "top_candidate",
            ReferenceType::TopCandidates => "top_candidates",
            ReferenceType::ThisCandidate => "this_candidate",
            ReferenceType::Pronoun => "pronoun",
            ReferenceType::SameCandidate => "same_candidate",
            ReferenceType::PreviousResults => "previous_results",
            ReferenceType::SeniorCandidate => "senior_candidate",
            ReferenceType::RiskContext => "risk_context",
            ReferenceType::None => "none",
        }
    }
}

/// A candidate identified in conversation history.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRef {
    pub name: String,
    pub cv_id: Option<String>,
    pub score: Option<u32>,
}

/// Outcome of resolving a query's reference against conversation history.
#[derive(Debug, Clone)]
pub struct ResolvedReference {
    pub resolved: bool,
    pub candidate_name: Option<String>,
    pub cv_id: Option<String>,
    pub reference_type: ReferenceType,
    /// Fixed at 0.85 when any pattern matches (spec §4.2).
    pub confidence: f32,
}

impl ResolvedReference {
    fn unresolved(reference_type: ReferenceType) -> Self {
        Self {
            resolved: false,
            candidate_name: None,
            cv_id: None,
            reference_type,
            confidence: 0.0,
        }
    }
}

static REFERENCE_PATTERNS: Lazy<Vec<(Regex, ReferenceType)>> = Lazy::new(|| {
    let specs: &[(&str, ReferenceType)] = &[
        (r"(?i)\b(the\s+)?top\s+candidate\b", ReferenceType::TopCandidate),
        (r"(?i)\b(el\s+)?top\s+candidate\b", ReferenceType::TopCandidate),
        (
            r"(?i)\b(el\s+)?(mejor|best)\s+(candidato|candidate)\b",
            ReferenceType::TopCandidate,
        ),
        (r"(?i)\b(the\s+)?best\s+one\b", ReferenceType::TopCandidate),
        (r"(?i)\b(el\s+)?número\s+uno\b", ReferenceType::TopCandidate),
        (r"(?i)\b(the\s+)?#1\b", ReferenceType::TopCandidate),
        (r"(?i)\b#1\s*candidate\b", ReferenceType::TopCandidate),
        (r"(?i)\b(the\s+)?first\s+one\b", ReferenceType::TopCandidate),
        (r"(?i)\b(the\s+)?first\s+candidate\b", ReferenceType::TopCandidate),
        (
            r"(?i)\bfull\s+profile\s+of\s+(the\s+)?#\d+\b",
            ReferenceType::TopCandidate,
        ),
        (r"(?i)\bprofile\s+of\s+(the\s+)?#\d+\b", ReferenceType::TopCandidate),
        (
            r"(?i)\b(compare|comparar)\s+(?:the\s+)?two\s+(?:best|top)\s+(?:candidates|candidatos)\b",
            ReferenceType::TopCandidates,
        ),
        (
            r"(?i)\b(this|that|ese|este|esta)\s+(candidato|candidate|person|persona)\b",
            ReferenceType::ThisCandidate,
        ),
        (r"(?i)\babout\s+(him|her|them)\b", ReferenceType::Pronoun),
        (r"(?i)\b(sobre\s+)?(él|ella|ellos)\b", ReferenceType::Pronoun),
        (
            r"(?i)\b(the\s+)?same\s+(candidate|person|candidato)\b",
            ReferenceType::SameCandidate,
        ),
        (
            r"(?i)\b(those|these|the)\s+(candidates|results|people)\b",
            ReferenceType::PreviousResults,
        ),
        (
            r"(?i)\b(esos|estos|las?)\s+(candidatos?|resultados|personas)\b",
            ReferenceType::PreviousResults,
        ),
        (
            r"(?i)\bmore\s+(info|information|details)\s+(about|on)\s+(them|those)\b",
            ReferenceType::PreviousResults,
        ),
        (
            r"(?i)\b(the\s+)?senior\s+(developer|engineer|candidate)\b",
            ReferenceType::SeniorCandidate,
        ),
        (r"(?i)\b(the\s+)?warning\s+signs\b", ReferenceType::RiskContext),
    ];
    specs
        .iter()
        .map(|(pattern, ty)| (Regex::new(pattern).expect("static pattern compiles"), *ty))
        .collect()
});

static CV_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[📄\]\(cv:(cv_[a-zA-Z0-9_-]+)\)\s*\*\*([^*]+)\*\*").unwrap());

static CV_LINK_WITH_SCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[📄\]\(cv:(cv_[a-zA-Z0-9_-]+)\)\s*\*\*([^*]+)\*\*[^0-9]*([0-9]+)%").unwrap()
});

static TOP_RECOMMENDATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Top\s+Recommendation:\s*\[📄\]\(cv:(cv_[a-zA-Z0-9_-]+)\)\s*\*\*([^*]+)\*\*[^0-9]*([0-9]+)%").unwrap()
});

static WINNER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\*\*([^*]+)\*\*[^.]*(?:emerges as the (?:clear )?winner|is the (?:stronger|better) candidate|wins the comparison)").unwrap(),
        Regex::new(r"(?i)(?:the\s+)?winner\s+is\s+\*\*([^*]+)\*\*").unwrap(),
        Regex::new(r"(?i)\*\*([^*]+)\*\*[^.]*(?:has the edge|comes out on top|is the winner)").unwrap(),
    ]
});

static SENIOR_BADGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[📄\]\(cv:(cv_[a-zA-Z0-9_-]+)\)\s*\*\*([^*]+)\*\*[^<\n]*(?:Senior|Principal|Lead)").unwrap()
});

static SENIOR_EXPERIENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[📄\]\(cv:(cv_[a-zA-Z0-9_-]+)\)\s*\*\*([^*]+)\*\*[^0-9]*(\d+)\s*(?:years?|yrs)").unwrap()
});

/// `(has_reference, reference_type)` — does the query contain any known
/// back-reference pattern?
pub fn has_reference_pattern(query: &str) -> (bool, ReferenceType) {
    for (re, ty) in REFERENCE_PATTERNS.iter() {
        if re.is_match(query) {
            return (true, *ty);
        }
    }
    (false, ReferenceType::None)
}

fn last_assistant_contents(history: &[Message]) -> impl Iterator<Item = &str> {
    history
        .iter()
        .rev()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.content.as_str())
}

fn extract_cv_id_for_name(content: &str, name: &str) -> Option<String> {
    let core_name = name.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
    let target = if core_name.is_empty() { name } else { &core_name };

    let pos = content.to_lowercase().find(&target.to_lowercase())?;
    let start = pos.saturating_sub(50);
    let end = (pos + target.len() + 50).min(content.len());
    let window = &content[start..end];
    let re = Regex::new(r"cv:(cv_[a-zA-Z0-9_-]+)").ok()?;
    re.captures(window).map(|c| c[1].to_string())
}

/// Looks for the single most-recently-referenced candidate, per the
/// ordered pattern cascade in the grounding source (ranking rows with
/// scores win over a bare "Top Recommendation:" line, which wins over a
/// plain first CV link).
fn extract_top_candidate(history: &[Message]) -> Option<CandidateRef> {
    for content in last_assistant_contents(history) {
        if let Some(c) = TOP_RECOMMENDATION.captures(content) {
            return Some(CandidateRef {
                name: c[2].trim().to_string(),
                cv_id: Some(c[1].to_string()),
                score: c[3].parse().ok(),
            });
        }

        let ranking: Vec<_> = CV_LINK_WITH_SCORE.captures_iter(content).collect();
        if !ranking.is_empty() {
            let best = ranking
                .iter()
                .max_by_key(|c| c[3].parse::<u32>().unwrap_or(0))
                .unwrap();
            return Some(CandidateRef {
                name: best[2].trim().to_string(),
                cv_id: Some(best[1].to_string()),
                score: best[3].parse().ok(),
            });
        }

        for pattern in WINNER_PATTERNS.iter() {
            if let Some(c) = pattern.captures(content) {
                let name = c[1].trim().to_string();
                let cv_id = extract_cv_id_for_name(content, &name);
                if cv_id.is_some() {
                    return Some(CandidateRef { name, cv_id, score: None });
                }
            }
        }

        if let Some(c) = CV_LINK.captures(content) {
            return Some(CandidateRef {
                name: c[2].trim().to_string(),
                cv_id: Some(c[1].to_string()),
                score: None,
            });
        }
    }
    None
}

fn extract_top_candidates(history: &[Message]) -> Option<Vec<CandidateRef>> {
    for content in last_assistant_contents(history) {
        let mut matches: Vec<(String, String, u32)> = CV_LINK_WITH_SCORE
            .captures_iter(content)
            .map(|c| (c[1].to_string(), c[2].trim().to_string(), c[3].parse().unwrap_or(0)))
            .collect();
        if matches.len() >= 2 {
            matches.sort_by(|a, b| b.2.cmp(&a.2));
            return Some(
                matches
                    .into_iter()
                    .take(2)
                    .map(|(cv_id, name, score)| CandidateRef {
                        name,
                        cv_id: Some(cv_id),
                        score: Some(score),
                    })
                    .collect(),
            );
        }
    }
    None
}

fn extract_previous_results(history: &[Message]) -> Option<Vec<CandidateRef>> {
    for content in last_assistant_contents(history) {
        let mut seen = std::collections::HashSet::new();
        let candidates: Vec<CandidateRef> = CV_LINK
            .captures_iter(content)
            .filter_map(|c| {
                let cv_id = c[1].to_string();
                if seen.insert(cv_id.clone()) {
                    Some(CandidateRef {
                        name: c[2].trim().to_string(),
                        cv_id: Some(cv_id),
                        score: None,
                    })
                } else {
                    None
                }
            })
            .collect();
        if !candidates.is_empty() {
            return Some(candidates);
        }
    }
    None
}

fn extract_senior_candidate(history: &[Message]) -> Option<CandidateRef> {
    for content in last_assistant_contents(history) {
        if let Some(c) = SENIOR_BADGE.captures(content) {
            return Some(CandidateRef {
                name: c[2].trim().to_string(),
                cv_id: Some(c[1].to_string()),
                score: None,
            });
        }

        let exp: Vec<_> = SENIOR_EXPERIENCE.captures_iter(content).collect();
        if !exp.is_empty() {
            let best = exp.iter().max_by_key(|c| c[3].parse::<u32>().unwrap_or(0)).unwrap();
            return Some(CandidateRef {
                name: best[2].trim().to_string(),
                cv_id: Some(best[1].to_string()),
                score: best[3].parse().ok(),
            });
        }
    }
    None
}

/// Finds the candidate(s) a reference type points to in history.
pub fn extract_candidate_from_history(
    history: &[Message],
    reference_type: ReferenceType,
) -> Option<Vec<CandidateRef>> {
    if history.is_empty() {
        return None;
    }

    match reference_type {
        ReferenceType::TopCandidates => extract_top_candidates(history),
        ReferenceType::PreviousResults => extract_previous_results(history),
        ReferenceType::SeniorCandidate => extract_senior_candidate(history).map(|c| vec![c]),
        _ => extract_top_candidate(history).map(|c| vec![c]),
    }
}

/// Resolves a query's reference pattern against history (spec §4.2).
pub fn resolve_reference(query: &str, history: &[Message]) -> ResolvedReference {
    let (has_ref, ref_type) = has_reference_pattern(query);
    if !has_ref {
        return ResolvedReference::unresolved(ReferenceType::None);
    }

    let Some(candidates) = extract_candidate_from_history(history, ref_type) else {
        return ResolvedReference {
            resolved: false,
            candidate_name: None,
            cv_id: None,
            reference_type: ref_type,
            confidence: 0.0,
        };
    };

    if candidates.is_empty() {
        return ResolvedReference::unresolved(ref_type);
    }

    if ref_type == ReferenceType::TopCandidates {
        let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        return ResolvedReference {
            resolved: true,
            candidate_name: Some(format!("Top 2: {}", names.join(", "))),
            cv_id: candidates[0].cv_id.clone(),
            reference_type: ref_type,
            confidence: 0.85,
        };
    }

    let primary = &candidates[0];
    ResolvedReference {
        resolved: true,
        candidate_name: Some(primary.name.clone()),
        cv_id: primary.cv_id.clone(),
        reference_type: ref_type,
        confidence: 0.85,
    }
}

/// Rewrites a query by substituting matched reference phrases with the
/// resolved candidate's name. Returns `(resolved_query, name?, cv_id?)`
/// (spec §4.2).
pub fn resolve_query_with_context(
    query: &str,
    history: &[Message],
) -> (String, Option<String>, Option<String>) {
    let resolution = resolve_reference(query, history);
    let Some(name) = resolution.candidate_name.clone() else {
        return (query.to_string(), None, None);
    };

    let replacements: &[&str] = &[
        r"(?i)#1\s*candidate",
        r"(?i)(the\s+)?#1\b",
        r"(?i)\b(the\s+)?top\s+candidate\b",
        r"(?i)\b(el\s+)?(mejor|best)\s+(candidato|candidate)\b",
        r"(?i)\b(the\s+)?best\s+one\b",
        r"(?i)\b(the\s+)?first\s+candidate\b",
        r"(?i)\b(the\s+)?first\s+one\b",
        r"(?i)\b(this|that|ese|este|esta)\s+(candidato|candidate|person|persona)\b",
    ];

    let mut resolved_query = query.to_string();
    for pattern in replacements {
        if let Ok(re) = Regex::new(pattern) {
            resolved_query = re.replace_all(&resolved_query, name.as_str()).into_owned();
        }
    }

    (resolved_query, Some(name), resolution.cv_id)
}

#[allow(dead_code)]
fn reference_type_name(ty: ReferenceType) -> &'static str {
    ty.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_types::Message;

    fn assistant(content: &str) -> Message {
        Message::assistant(content)
    }

    #[test]
    fn detects_top_candidate_pattern() {
        let (has_ref, ty) = has_reference_pattern("tell me more about the top candidate");
        assert!(has_ref);
        assert_eq!(ty, ReferenceType::TopCandidate);
    }

    #[test]
    fn detects_spanish_pronoun() {
        let (has_ref, ty) = has_reference_pattern("cuéntame más sobre él");
        assert!(has_ref);
        assert_eq!(ty, ReferenceType::Pronoun);
    }

    #[test]
    fn resolves_top_candidate_from_ranking_history() {
        let history = vec![assistant(
            "Here are the results:\n[📄](cv:cv_abc) **Jane Doe** 92%\n[📄](cv:cv_def) **John Smith** 80%",
        )];
        let resolution = resolve_reference("tell me about the top candidate", &history);
        assert!(resolution.resolved);
        assert_eq!(resolution.candidate_name.as_deref(), Some("Jane Doe"));
        assert_eq!(resolution.cv_id.as_deref(), Some("cv_abc"));
        assert!((resolution.confidence - 0.85).abs() < 0.001);
    }

    #[test]
    fn resolves_top_recommendation_format() {
        let history = vec![assistant(
            "Top Recommendation: [📄](cv:cv_xyz) **Ana García** with 95% match.",
        )];
        let resolution = resolve_reference("give me the full profile of #1", &history);
        assert_eq!(resolution.candidate_name.as_deref(), Some("Ana García"));
        assert_eq!(resolution.cv_id.as_deref(), Some("cv_xyz"));
    }

    #[test]
    fn resolves_top_candidates_pair() {
        let history = vec![assistant(
            "[📄](cv:cv_1) **A** 90%\n[📄](cv:cv_2) **B** 85%\n[📄](cv:cv_3) **C** 50%",
        )];
        let resolution = resolve_reference("compare the two best candidates", &history);
        assert!(resolution.resolved);
        assert_eq!(resolution.reference_type, ReferenceType::TopCandidates);
        assert!(resolution.candidate_name.unwrap().contains("A"));
    }

    #[test]
    fn no_reference_pattern_returns_unresolved() {
        let resolution = resolve_reference("what skills does Jane have?", &[]);
        assert!(!resolution.resolved);
        assert_eq!(resolution.reference_type, ReferenceType::None);
    }

    #[test]
    fn resolve_query_with_context_rewrites_query() {
        let history = vec![assistant("[📄](cv:cv_abc) **Jane Doe** 92%")];
        let (resolved, name, cv_id) =
            resolve_query_with_context("what about the top candidate?", &history);
        assert!(resolved.contains("Jane Doe"));
        assert_eq!(name.as_deref(), Some("Jane Doe"));
        assert_eq!(cv_id.as_deref(), Some("cv_abc"));
    }
}
