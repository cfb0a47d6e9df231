//! Suggestion Engine (C13)
//!
//! Turns the current turn's query type plus whatever candidates/skills/roles
//! show up in the conversation into a handful of ready-to-click follow-up
//! questions. Three pieces, mirroring the pipeline the bank data and
//! selection algorithm were ported from:
//!
//! 1. [`ContextExtractor`] mines `mentioned_candidates`/`mentioned_skills`/
//!    `mentioned_roles` out of the session's message history.
//! 2. [`SuggestionSelector`] maps the query type onto one of the ten banks,
//!    filters by what placeholders can actually be filled, and picks a
//!    priority-ordered, in-group-shuffled set — tracking which ids a
//!    session has already seen so repeats don't pile up.
//! 3. [`fill_templates`] substitutes `{candidate_name}`/`{skill}`/`{role}`/
//!    `{num_cvs}` into the chosen templates.
//!
//! Unlike the system this was ported from, `Session`/`Message` here carry no
//! per-turn `structure_type` tag, so the caller passes the current turn's
//! `QueryType` in explicitly rather than having it re-derived from history.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::thread_rng;
use regex::Regex;
use tracing::debug;

use cv_types::{Message, QueryType, Role};

/// One suggestion template. `id` is a stable key used for per-session
/// de-dup; banks are `static` data, not generated at runtime.
#[derive(Debug, Clone, Copy)]
pub struct Suggestion {
    pub id: &'static str,
    pub text: &'static str,
    pub requires_candidate: bool,
    pub requires_skill: bool,
    pub requires_role: bool,
    pub requires_multiple_cvs: bool,
    pub min_cvs: usize,
    pub priority: u8,
}

const fn s(id: &'static str, text: &'static str, priority: u8) -> Suggestion {
    Suggestion {
        id,
        text,
        requires_candidate: false,
        requires_skill: false,
        requires_role: false,
        requires_multiple_cvs: false,
        min_cvs: 1,
        priority,
    }
}

const fn candidate(mut sug: Suggestion) -> Suggestion {
    sug.requires_candidate = true;
    sug
}

const fn multi(mut sug: Suggestion, min_cvs: usize) -> Suggestion {
    sug.requires_multiple_cvs = true;
    sug.min_cvs = min_cvs;
    sug
}

const fn role(mut sug: Suggestion) -> Suggestion {
    sug.requires_role = true;
    sug
}

const fn no_cvs_required(mut sug: Suggestion) -> Suggestion {
    sug.min_cvs = 0;
    sug
}

static INITIAL_BANK: &[Suggestion] = &[
    // No CVs indexed yet — shown before any résumé has been uploaded.
    no_cvs_required(s("init_upload_first", "Upload a résumé to get started", 1)),
    no_cvs_required(s("init_what_can_you_do", "What kinds of questions can you answer about candidates?", 1)),
    s("init_overview", "Give me an overview of the talent pool", 1),
    s("init_tech", "What technologies do the candidates know best?", 1),
    s("init_senior_count", "How many candidates have senior-level experience?", 1),
    candidate(s("init_profile", "Give me {candidate_name}'s full profile", 1)),
    multi(s("init_ranking", "Rank the candidates by experience", 1), 3),
    s("init_most_experienced", "Who has the most total experience?", 1),
    s("init_python", "Who has experience with Python?", 2),
    s("init_startups", "Are there candidates with startup experience?", 2),
    s("init_leadership", "Find candidates with leadership experience", 2),
    s("init_frontend", "Who has React or frontend experience?", 2),
    multi(s("init_compare_top2", "Compare the two most experienced candidates", 2), 2),
    s("init_stability_risk", "Are there candidates with job-stability red flags?", 3),
    s("init_common_skills", "What are the most common skills across candidates?", 2),
    s("init_diverse_profile", "Who has the most diverse skill set?", 3),
    s("init_education", "What education levels do the candidates have?", 3),
];

static SINGLE_CANDIDATE_BANK: &[Suggestion] = &[
    candidate(s("sc_red_flags", "Are there any red flags for {candidate_name}?", 1)),
    candidate(s("sc_stability", "Analyze {candidate_name}'s job stability", 1)),
    s("sc_gaps", "Does this candidate have any significant employment gaps?", 1),
    candidate(s("sc_certs", "Verify {candidate_name}'s certifications", 2)),
    s("sc_consistency", "Is the claimed experience internally consistent?", 2),
    multi(candidate(s("sc_compare_similar", "Compare {candidate_name} to another similar candidate", 1)), 2),
    multi(s("sc_who_else", "Who else has a similar profile?", 1), 2),
    candidate(s("sc_ideal_roles", "What roles would {candidate_name} be ideal for?", 1)),
    role(candidate(s("sc_role_match", "How well does {candidate_name} match a {role} role?", 2))),
    candidate(s("sc_unique_skills", "What unique skills does {candidate_name} have?", 2)),
    candidate(s("sc_career_path", "Walk me through {candidate_name}'s career path", 2)),
    candidate(s("sc_growth", "Could {candidate_name} grow into a more senior role here?", 2)),
    multi(candidate(s("sc_where_ranked", "Where does {candidate_name} rank against the others?", 2)), 2),
    s("sc_standout_projects", "What standout projects appear in their experience?", 3),
];

static RANKING_BANK: &[Suggestion] = &[
    multi(s("rank_top3", "Who are the top 3 candidates and why?", 1), 3),
    multi(s("rank_by_skill", "Rank candidates by {skill} proficiency", 1), 2),
    multi(s("rank_seniority", "Rank candidates from most to least senior", 1), 2),
    multi(s("rank_explain_gap", "Why does the top candidate rank higher than the rest?", 2), 2),
    multi(s("rank_narrow_role", "Rank candidates specifically for a {role} position", 2), 2),
];

static COMPARISON_BANK: &[Suggestion] = &[
    multi(s("cmp_strengths", "What are the key differences in their strengths?", 1), 2),
    multi(s("cmp_who_better_fit", "Who would be the better fit for a fast-moving team?", 1), 2),
    multi(s("cmp_skill_overlap", "Where do their skill sets overlap?", 2), 2),
    multi(s("cmp_risk", "Which of the two carries more hiring risk?", 2), 2),
];

static SEARCH_BANK: &[Suggestion] = &[
    s("search_broaden", "Broaden the search to related skills too", 1),
    s("search_seniority_filter", "Filter these results to senior candidates only", 1),
    multi(s("search_narrow_compare", "Compare the candidates that matched this search", 2), 2),
    s("search_more_context", "Show more context for the top match", 2),
];

static JOB_MATCH_BANK: &[Suggestion] = &[
    role(s("jm_best_fit", "Who best matches a {role} opening?", 1)),
    s("jm_gaps", "What gaps exist between the candidates and this role's requirements?", 1),
    multi(s("jm_shortlist", "Build a shortlist of 3 candidates for this role", 2), 3),
    role(s("jm_onboarding_risk", "Would any of them need significant ramp-up for a {role} role?", 2)),
];

static TEAM_BUILD_BANK: &[Suggestion] = &[
    multi(s("tb_complementary", "Which combination of candidates covers the most skill areas?", 1), 3),
    multi(s("tb_seniority_mix", "Build a team with a good senior/junior mix", 1), 3),
    multi(s("tb_redundancy", "Are there redundant skill sets across this team?", 2), 3),
    multi(s("tb_leadership", "Does this team have someone who can lead it?", 2), 3),
];

static RISK_ASSESSMENT_BANK: &[Suggestion] = &[
    s("risk_job_hopping", "Which candidates show signs of frequent job-hopping?", 1),
    s("risk_unexplained_gaps", "Which candidates have unexplained employment gaps?", 1),
    candidate(s("risk_specific", "What's the overall risk profile for {candidate_name}?", 1)),
    s("risk_overstated", "Does any candidate's experience look overstated?", 2),
    s("risk_lowest", "Who carries the lowest hiring risk overall?", 2),
];

static VERIFICATION_BANK: &[Suggestion] = &[
    s("verify_claim", "Can you verify that claim against the original résumé text?", 1),
    candidate(s("verify_candidate", "Double-check {candidate_name}'s stated experience", 1)),
    s("verify_sources", "Which CV excerpts support this answer?", 2),
];

static SUMMARY_BANK: &[Suggestion] = &[
    multi(s("sum_pool", "Summarize the whole candidate pool in a few sentences", 1), 2),
    candidate(s("sum_one", "Summarize {candidate_name}'s profile in a few sentences", 1)),
    s("sum_standouts", "What stands out most across these résumés?", 2),
];

fn bank_for(query_type: QueryType) -> &'static [Suggestion] {
    match query_type {
        QueryType::SingleCandidate => SINGLE_CANDIDATE_BANK,
        QueryType::Ranking => RANKING_BANK,
        QueryType::Comparison => COMPARISON_BANK,
        QueryType::Search => SEARCH_BANK,
        QueryType::JobMatch => JOB_MATCH_BANK,
        QueryType::TeamBuild => TEAM_BUILD_BANK,
        QueryType::RiskAssessment | QueryType::RedFlags => RISK_ASSESSMENT_BANK,
        QueryType::Verification => VERIFICATION_BANK,
        QueryType::Summary => SUMMARY_BANK,
        QueryType::Initial => INITIAL_BANK,
    }
}

/// Context mined from a session's history, used to filter and fill
/// suggestion templates.
#[derive(Debug, Clone, Default)]
pub struct ExtractedContext {
    pub mentioned_candidates: Vec<String>,
    pub mentioned_skills: Vec<String>,
    pub mentioned_roles: Vec<String>,
    pub num_cvs: usize,
    pub cv_names: Vec<String>,
    pub is_first_query: bool,
}

static CANDIDATE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*\[([^\]]+)\]\(cv:cv_[a-zA-Z0-9_-]+\)\*\*").unwrap());
static CANDIDATE_ICON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\p{So}\]\(cv:cv_[a-zA-Z0-9_-]+\)\s*\*\*([^*]+)\*\*").unwrap());
static BOLD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([A-Z][\p{L}'.-]+(?:\s+[A-Z][\p{L}'.-]+)+)\*\*").unwrap());

const NON_NAME_WORDS: &[&str] = &["summary", "analysis", "conclusion", "candidate"];

const COMMON_SKILLS: &[&str] = &[
    "python", "javascript", "typescript", "java", "c++", "c#", "go", "rust", "ruby", "php",
    "react", "vue", "angular", "svelte", "next.js", "node.js", "express", "django", "flask",
    "fastapi", "postgresql", "mysql", "mongodb", "redis", "elasticsearch", "graphql", "docker",
    "kubernetes", "aws", "azure", "gcp", "terraform", "jenkins", "ci/cd", "git", "linux", "agile",
    "scrum", "microservices", "machine learning", "tensorflow", "pytorch", "pandas", "numpy",
    "sql", "html", "css", "spring", "unity", "figma", "frontend", "backend", "fullstack",
];

static ROLE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"(?i)\bbackend\s+developer\b").unwrap(), "Backend Developer"),
        (Regex::new(r"(?i)\bfrontend\s+developer\b").unwrap(), "Frontend Developer"),
        (Regex::new(r"(?i)\b(?:full.?stack)\s+developer\b").unwrap(), "Fullstack Developer"),
        (Regex::new(r"(?i)\bsenior\s+engineer\b").unwrap(), "Senior Engineer"),
        (Regex::new(r"(?i)\bsenior\s+developer\b").unwrap(), "Senior Developer"),
        (Regex::new(r"(?i)\btech\s+lead\b").unwrap(), "Tech Lead"),
        (Regex::new(r"(?i)\bteam\s+lead\b").unwrap(), "Team Lead"),
        (Regex::new(r"(?i)\bdata\s+scientist\b").unwrap(), "Data Scientist"),
        (Regex::new(r"(?i)\bdata\s+engineer\b").unwrap(), "Data Engineer"),
        (Regex::new(r"(?i)\bdevops\s+engineer\b").unwrap(), "DevOps Engineer"),
        (Regex::new(r"(?i)\bsoftware\s+architect\b").unwrap(), "Software Architect"),
        (Regex::new(r"(?i)\b(?:ml|machine\s+learning)\s+engineer\b").unwrap(), "ML Engineer"),
        (Regex::new(r"(?i)\bproduct\s+manager\b").unwrap(), "Product Manager"),
        (Regex::new(r"(?i)\bproject\s+manager\b").unwrap(), "Project Manager"),
    ]
});

const DEFAULT_ROLES: &[&str] = &[
    "Backend Developer",
    "Frontend Developer",
    "Senior Engineer",
    "Tech Lead",
    "Data Scientist",
    "Fullstack Developer",
];

/// Mines mentioned candidates/skills/roles out of a session's messages.
pub struct ContextExtractor;

impl ContextExtractor {
    pub fn extract(history: &[Message], cv_names: &[String], num_cvs: usize) -> ExtractedContext {
        let mut context = ExtractedContext {
            num_cvs,
            cv_names: cv_names.to_vec(),
            is_first_query: history.is_empty(),
            ..Default::default()
        };

        for message in history.iter().rev() {
            match message.role {
                Role::Assistant => {
                    for name in Self::extract_candidates(&message.content) {
                        if !context.mentioned_candidates.contains(&name) {
                            context.mentioned_candidates.push(name);
                        }
                    }
                }
                Role::User => {
                    for skill in Self::extract_skills(&message.content) {
                        if !context.mentioned_skills.contains(&skill) {
                            context.mentioned_skills.push(skill);
                        }
                    }
                    for role in Self::extract_roles(&message.content) {
                        if !context.mentioned_roles.contains(&role) {
                            context.mentioned_roles.push(role);
                        }
                    }
                }
            }
        }

        if context.is_first_query {
            context.mentioned_candidates.extend(cv_names.iter().cloned());
        } else {
            for name in cv_names {
                if !context.mentioned_candidates.contains(name) {
                    context.mentioned_candidates.push(name.clone());
                }
            }
        }

        context.mentioned_candidates.truncate(5);
        context.mentioned_skills.truncate(5);
        context.mentioned_roles.truncate(3);

        debug!(
            candidates = context.mentioned_candidates.len(),
            skills = context.mentioned_skills.len(),
            "extracted suggestion context"
        );

        context
    }

    fn extract_candidates(text: &str) -> Vec<String> {
        let mut names = Vec::new();
        for pattern in [&*CANDIDATE_LINK, &*CANDIDATE_ICON] {
            for caps in pattern.captures_iter(text) {
                let name = caps[1].trim().to_string();
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        for caps in BOLD_NAME.captures_iter(text) {
            let name = caps[1].trim().to_string();
            if name.is_empty() || name.len() >= 40 || names.contains(&name) {
                continue;
            }
            let lower = name.to_lowercase();
            if NON_NAME_WORDS.iter().any(|w| lower.contains(w)) {
                continue;
            }
            names.push(name);
        }
        names
    }

    fn extract_skills(text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        COMMON_SKILLS
            .iter()
            .filter(|skill| word_boundary_contains(&lower, skill))
            .map(|s| s.to_string())
            .collect()
    }

    fn extract_roles(text: &str) -> Vec<String> {
        ROLE_PATTERNS
            .iter()
            .filter(|(pattern, _)| pattern.is_match(text))
            .map(|(_, title)| title.to_string())
            .collect()
    }
}

fn word_boundary_contains(haystack: &str, needle: &str) -> bool {
    if needle.chars().all(|c| c.is_alphanumeric()) {
        haystack
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == needle)
    } else {
        haystack.contains(needle)
    }
}

/// Selects and prioritizes suggestions for one session, tracking which ids
/// that session has already seen so repeats thin out over a conversation.
pub struct SuggestionSelector {
    used_ids: Mutex<HashMap<String, HashSet<&'static str>>>,
}

impl Default for SuggestionSelector {
    fn default() -> Self {
        Self {
            used_ids: Mutex::new(HashMap::new()),
        }
    }
}

impl SuggestionSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets de-dup state for a session (call when a session resets).
    pub fn reset_session(&self, session_id: &str) {
        self.used_ids.lock().remove(session_id);
    }

    pub fn select(
        &self,
        session_id: &str,
        query_type: QueryType,
        context: &ExtractedContext,
        count: usize,
    ) -> Vec<Suggestion> {
        let has_candidate = !context.mentioned_candidates.is_empty();
        let has_skill = !context.mentioned_skills.is_empty();
        let has_role = !context.mentioned_roles.is_empty() || has_skill;

        let mut used_by_session = self.used_ids.lock();
        let used = used_by_session.entry(session_id.to_string()).or_default();

        let applicable = Self::applicable(
            bank_for(query_type),
            context.num_cvs,
            has_candidate,
            has_skill,
            has_role,
            used,
        );

        let mut by_priority: HashMap<u8, Vec<Suggestion>> = HashMap::new();
        for sug in applicable {
            by_priority.entry(sug.priority).or_default().push(sug);
        }

        let mut priorities: Vec<u8> = by_priority.keys().copied().collect();
        priorities.sort_unstable();

        let mut selected = Vec::new();
        let mut rng = thread_rng();
        for priority in priorities {
            let mut group = by_priority.remove(&priority).unwrap_or_default();
            group.shuffle(&mut rng);
            for sug in group {
                if selected.len() >= count {
                    break;
                }
                used.insert(sug.id);
                selected.push(sug);
            }
            if selected.len() >= count {
                break;
            }
        }

        if selected.len() < count {
            let backfill = Self::applicable(
                INITIAL_BANK,
                context.num_cvs,
                has_candidate,
                has_skill,
                has_role,
                used,
            );
            for sug in backfill {
                if selected.len() >= count {
                    break;
                }
                used.insert(sug.id);
                selected.push(sug);
            }
        }

        debug!(count = selected.len(), ?query_type, "selected suggestions");
        selected
    }

    fn applicable(
        bank: &'static [Suggestion],
        num_cvs: usize,
        has_candidate: bool,
        has_skill: bool,
        has_role: bool,
        used: &HashSet<&'static str>,
    ) -> Vec<Suggestion> {
        bank.iter()
            .copied()
            .filter(|sug| sug.min_cvs <= num_cvs)
            .filter(|sug| !sug.requires_multiple_cvs || num_cvs >= 2)
            .filter(|sug| !sug.requires_candidate || has_candidate)
            .filter(|sug| !sug.requires_skill || has_skill)
            .filter(|sug| !sug.requires_role || has_role)
            .filter(|sug| !used.contains(sug.id))
            .collect()
    }
}

/// Substitutes `{candidate_name}`/`{skill}`/`{role}`/`{num_cvs}` into the
/// selected templates, trying not to repeat the same name/skill twice in
/// one batch. Templates that need a placeholder with nothing to fill it
/// are dropped rather than rendered with a blank.
pub fn fill_templates(suggestions: &[Suggestion], context: &ExtractedContext) -> Vec<String> {
    let mut filled = Vec::new();
    let mut used_candidates = HashSet::new();
    let mut used_skills = HashSet::new();
    let mut rng = thread_rng();

    for sug in suggestions {
        let mut text = sug.text.to_string();

        if text.contains("{candidate_name}") {
            let available: Vec<&String> = context
                .mentioned_candidates
                .iter()
                .filter(|c| !used_candidates.contains(c.as_str()))
                .collect();
            let pool: Vec<&String> = if available.is_empty() {
                context
                    .mentioned_candidates
                    .iter()
                    .chain(context.cv_names.iter())
                    .collect()
            } else {
                available
            };
            match pool.choose(&mut rng) {
                Some(name) => {
                    used_candidates.insert(name.as_str().to_string());
                    text = text.replace("{candidate_name}", name.as_str());
                }
                None => continue,
            }
        }

        if text.contains("{skill}") {
            let available: Vec<&String> = context
                .mentioned_skills
                .iter()
                .filter(|skl| !used_skills.contains(skl.as_str()))
                .collect();
            let pool = if available.is_empty() {
                context.mentioned_skills.iter().collect::<Vec<_>>()
            } else {
                available
            };
            match pool.choose(&mut rng) {
                Some(skill) => {
                    used_skills.insert(skill.as_str().to_string());
                    text = text.replace("{skill}", &title_case(skill.as_str()));
                }
                None => continue,
            }
        }

        if text.contains("{role}") {
            let role = context
                .mentioned_roles
                .choose(&mut rng)
                .cloned()
                .unwrap_or_else(|| (*DEFAULT_ROLES.choose(&mut rng).unwrap()).to_string());
            text = text.replace("{role}", &role);
        }

        text = text.replace("{num_cvs}", &context.num_cvs.to_string());

        filled.push(text);
    }

    filled
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Top-level entry point: extracts context, selects, then fills templates.
/// The `count + 2` oversampling mirrors the original engine — some
/// selections get dropped at fill time when a placeholder has nothing to
/// substitute, so a couple of spares are fetched up front.
pub struct SuggestionEngine {
    selector: SuggestionSelector,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self {
            selector: SuggestionSelector::new(),
        }
    }

    pub fn suggestions(
        &self,
        session_id: &str,
        query_type: QueryType,
        history: &[Message],
        cv_names: &[String],
        count: usize,
    ) -> Vec<String> {
        let context = ContextExtractor::extract(history, cv_names, cv_names.len());
        let selected = self.selector.select(session_id, query_type, &context, count + 2);
        let mut filled = fill_templates(&selected, &context);
        filled.truncate(count);
        filled
    }

    pub fn reset_session(&self, session_id: &str) {
        self.selector.reset_session(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_types::Message;

    #[test]
    fn initial_bank_respects_min_cvs() {
        let context = ExtractedContext {
            num_cvs: 1,
            is_first_query: true,
            ..Default::default()
        };
        let selector = SuggestionSelector::new();
        let selected = selector.select("s1", QueryType::Initial, &context, 10);
        assert!(selected.iter().all(|s| s.min_cvs <= 1));
        assert!(selected.iter().all(|s| !s.requires_multiple_cvs));
    }

    #[test]
    fn empty_session_yields_only_placeholder_free_zero_cv_suggestions() {
        let context = ExtractedContext {
            num_cvs: 0,
            is_first_query: true,
            ..Default::default()
        };
        let selector = SuggestionSelector::new();
        let selected = selector.select("s1", QueryType::Initial, &context, 10);
        assert!(!selected.is_empty());
        assert!(selected.iter().all(|s| s.min_cvs == 0));
        assert!(selected
            .iter()
            .all(|s| !s.requires_candidate && !s.requires_skill && !s.requires_role && !s.requires_multiple_cvs));
    }

    #[test]
    fn single_candidate_bank_needs_a_candidate() {
        let no_candidate = ExtractedContext {
            num_cvs: 3,
            ..Default::default()
        };
        let selector = SuggestionSelector::new();
        let selected = selector.select("s1", QueryType::SingleCandidate, &no_candidate, 10);
        assert!(selected.iter().all(|s| !s.requires_candidate));

        let with_candidate = ExtractedContext {
            num_cvs: 3,
            mentioned_candidates: vec!["Jane Doe".to_string()],
            ..Default::default()
        };
        let selector = SuggestionSelector::new();
        let selected = selector.select("s1", QueryType::SingleCandidate, &with_candidate, 20);
        assert!(selected.iter().any(|s| s.requires_candidate));
    }

    #[test]
    fn red_flags_and_risk_assessment_share_a_bank() {
        assert_eq!(bank_for(QueryType::RedFlags).len(), bank_for(QueryType::RiskAssessment).len());
    }

    #[test]
    fn session_dedup_does_not_repeat_ids_across_calls() {
        let context = ExtractedContext {
            num_cvs: 5,
            mentioned_candidates: vec!["Jane Doe".to_string()],
            ..Default::default()
        };
        let selector = SuggestionSelector::new();
        let first = selector.select("session-a", QueryType::Initial, &context, 5);
        let second = selector.select("session-a", QueryType::Initial, &context, 5);
        let first_ids: HashSet<&str> = first.iter().map(|s| s.id).collect();
        let second_ids: HashSet<&str> = second.iter().map(|s| s.id).collect();
        assert!(first_ids.is_disjoint(&second_ids));
    }

    #[test]
    fn reset_session_clears_dedup_state() {
        let context = ExtractedContext {
            num_cvs: 5,
            ..Default::default()
        };
        let selector = SuggestionSelector::new();
        let first = selector.select("session-a", QueryType::Initial, &context, 15);
        selector.reset_session("session-a");
        let second = selector.select("session-a", QueryType::Initial, &context, 15);
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn extracts_candidate_names_from_bold_links() {
        let history = vec![Message::assistant(
            "Top match: **[Jane Doe](cv:cv_abc123)** with 90% relevance.",
        )];
        let context = ContextExtractor::extract(&history, &[], 3);
        assert_eq!(context.mentioned_candidates, vec!["Jane Doe".to_string()]);
    }

    #[test]
    fn extracts_skills_and_roles_from_user_queries() {
        let history = vec![Message::user("Who knows rust and could work as a tech lead?")];
        let context = ContextExtractor::extract(&history, &[], 2);
        assert!(context.mentioned_skills.contains(&"rust".to_string()));
        assert!(context.mentioned_roles.contains(&"Tech Lead".to_string()));
    }

    #[test]
    fn fill_templates_drops_candidate_placeholder_with_no_candidates() {
        let sug = Suggestion {
            id: "test_candidate",
            text: "Tell me about {candidate_name}",
            requires_candidate: true,
            requires_skill: false,
            requires_role: false,
            requires_multiple_cvs: false,
            min_cvs: 1,
            priority: 1,
        };
        let context = ExtractedContext::default();
        let filled = fill_templates(&[sug], &context);
        assert!(filled.is_empty());
    }

    #[test]
    fn fill_templates_substitutes_num_cvs() {
        let sug = Suggestion {
            id: "test_num",
            text: "There are {num_cvs} candidates in this session",
            requires_candidate: false,
            requires_skill: false,
            requires_role: false,
            requires_multiple_cvs: false,
            min_cvs: 1,
            priority: 1,
        };
        let context = ExtractedContext {
            num_cvs: 7,
            ..Default::default()
        };
        let filled = fill_templates(&[sug], &context);
        assert_eq!(filled, vec!["There are 7 candidates in this session".to_string()]);
    }

    #[test]
    fn engine_returns_at_most_requested_count() {
        let engine = SuggestionEngine::new();
        let cv_names = vec!["Jane Doe".to_string(), "John Smith".to_string()];
        let suggestions = engine.suggestions("session-x", QueryType::Initial, &[], &cv_names, 4);
        assert!(suggestions.len() <= 4);
    }
}
