//! Structure Router (C11) and the ten response structures it assembles.
//!
//! Each [`QueryType`] routes to exactly one [`Structure`] variant, built
//! from the shared reusable [`crate::modules`]. Computed fields always win
//! over the LLM's free text (spec §9): `Ranking::top_pick` is derived from
//! the same `overall` the ranking table sorts on, and
//! `Verification::conclusion` is rewritten whenever the derived verdict is
//! `NotFound`/`Contradicted` but the LLM's prose still reads as
//! affirmative.
//!
//! Grounded on `original_source/.../output_processor/structures/*.py` and
//! `output_processor/orchestrator.py` (the dispatch-by-query-type shape).

use cv_types::{EnrichedMetadata, QueryType, ScoringProfile, SearchResult, StructuredOutput, TableRow, VerificationInfo};

use crate::modules::match_score::{self, MatchScoreResult};
use crate::modules::ranking::{self, RankedCandidate, RankingCriterion};
use crate::modules::requirements;
use crate::modules::risk::{self, RiskAssessment};
use crate::modules::skill;
use crate::modules::team::{self, MemberCard, TeamComposition, TeamRisk, TeamSynergy};
use crate::modules::timeline::{self, TimelineEntry};
use crate::modules::top_pick::{self, TopPick};
use crate::modules::verdict::{self, Verdict};
use crate::scoring::{CandidateScore, ScoringService};

/// One indexed candidate in the current session, keyed for every module
/// that needs `(cv_id, name, metadata)`.
#[derive(Debug, Clone)]
pub struct CandidateContext {
    pub cv_id: String,
    pub candidate_name: String,
    pub metadata: EnrichedMetadata,
}

/// Everything a structure assembler might need. Not every field is used
/// by every structure.
pub struct StructureContext<'a> {
    pub candidates: &'a [CandidateContext],
    pub search_results: &'a [SearchResult],
    pub requirements: &'a [String],
    pub scoring_profile: &'a ScoringProfile,
    pub verification: Option<&'a VerificationInfo>,
    pub structured_output: &'a StructuredOutput,
    /// The reformulated question, used only by [`StructureRouter::adaptive`]
    /// to pick which columns the dynamic table renders (spec §4.10).
    pub query: &'a str,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "structure_type", rename_all = "snake_case")]
pub enum Structure {
    SingleCandidate {
        score: CandidateScore,
        match_score: MatchScoreResult,
        risk: RiskAssessment,
        timeline: Vec<TimelineEntry>,
    },
    Ranking {
        criteria_table: Vec<RankingCriterion>,
        ranked: Vec<RankedCandidate>,
        markdown_table: String,
        top_pick: Option<TopPick>,
        analysis: String,
        conclusion: String,
    },
    Comparison {
        scores: Vec<CandidateScore>,
    },
    Search {
        results_table: Vec<TableRow>,
        requirements_table: Vec<(String, u32)>,
    },
    JobMatch {
        scores: Vec<CandidateScore>,
        gaps: crate::modules::gap_analysis::GapAnalysis,
        top_pick: Option<TopPick>,
    },
    TeamBuild {
        composition: TeamComposition,
        synergy: TeamSynergy,
        team_risk: TeamRisk,
        members: Vec<MemberCard>,
    },
    RiskAssessment {
        assessments: Vec<RiskAssessment>,
    },
    RedFlags {
        flags: Vec<crate::modules::red_flags::RedFlag>,
    },
    Verification {
        verdict: Verdict,
        conclusion: String,
        info: VerificationInfo,
    },
    Summary {
        candidate_count: usize,
        skill_distribution: Vec<(String, u32)>,
        experience_distribution: Vec<(String, u32)>,
    },
    Adaptive {
        table: crate::modules::adaptive::AdaptiveTable,
    },
}

pub struct StructureRouter;

impl StructureRouter {
    pub fn route(query_type: QueryType, ctx: &StructureContext<'_>) -> Structure {
        match query_type {
            QueryType::SingleCandidate => Self::single_candidate(ctx),
            QueryType::Ranking => Self::ranking(ctx),
            QueryType::Comparison => Self::comparison(ctx),
            QueryType::Search => Self::search(ctx),
            QueryType::JobMatch => Self::job_match(ctx),
            QueryType::TeamBuild => Self::team_build(ctx),
            QueryType::RiskAssessment => Self::risk_assessment(ctx),
            QueryType::RedFlags => Self::red_flags(ctx),
            QueryType::Verification => Self::verification(ctx),
            QueryType::Summary => Self::summary(ctx),
            QueryType::Initial => Self::adaptive(ctx),
        }
    }

    fn single_candidate(ctx: &StructureContext<'_>) -> Structure {
        let candidate = ctx.candidates.first();
        let (score, match_score, risk, timeline) = match candidate {
            Some(c) => (
                ScoringService::score(&c.cv_id, &c.candidate_name, &c.metadata, ctx.scoring_profile, ctx.requirements)
                    .unwrap_or_else(|_| neutral_score(&c.cv_id, &c.candidate_name)),
                match_score::match_requirements(&c.cv_id, &c.candidate_name, &c.metadata, ctx.requirements),
                risk::assess(&c.cv_id, &c.candidate_name, &c.metadata),
                timeline::timeline(&c.metadata),
            ),
            None => (
                neutral_score("", ""),
                match_score::match_requirements("", "", &EnrichedMetadata::default(), ctx.requirements),
                risk::assess("", "", &EnrichedMetadata::default()),
                Vec::new(),
            ),
        };
        Structure::SingleCandidate { score, match_score, risk, timeline }
    }

    fn ranking(ctx: &StructureContext<'_>) -> Structure {
        let triples = candidate_triples(ctx.candidates);
        let criteria = default_ranking_criteria();
        let ranked = ranking::rank_candidates(&triples, &criteria);
        let markdown_table = ranking::render_markdown(&ranked, &criteria.iter().map(|c| c.name.clone()).collect::<Vec<_>>());
        // Top pick is derived from the same ranking table the candidate
        // sees (spec §8: the max-`overall_score` row must equal the top
        // pick), never from a separately-weighted scoring pass.
        let top_pick = top_pick::pick_from_ranked(&ranked);
        let (conclusion, analysis) = ranking_conclusion_and_analysis(
            &ranked,
            top_pick.as_ref(),
            ctx.structured_output.conclusion.as_deref(),
            ctx.structured_output.analysis.as_deref(),
        );
        Structure::Ranking { criteria_table: criteria, ranked, markdown_table, top_pick, analysis, conclusion }
    }

    fn comparison(ctx: &StructureContext<'_>) -> Structure {
        Structure::Comparison { scores: score_all(ctx) }
    }

    fn search(ctx: &StructureContext<'_>) -> Structure {
        let results_table = ctx
            .structured_output
            .table_data
            .clone()
            .unwrap_or_else(|| requirements::results_table(ctx.search_results));
        let requirements_table = requirements::requirements_table(ctx.requirements, ctx.search_results);
        Structure::Search { results_table, requirements_table }
    }

    fn job_match(ctx: &StructureContext<'_>) -> Structure {
        let scores = score_all(ctx);
        let metadatas: Vec<EnrichedMetadata> = ctx.candidates.iter().map(|c| c.metadata.clone()).collect();
        let gaps = crate::modules::gap_analysis::analyze(&metadatas, ctx.requirements);
        let top_pick = top_pick::pick(&scores);
        Structure::JobMatch { scores, gaps, top_pick }
    }

    fn team_build(ctx: &StructureContext<'_>) -> Structure {
        let metadatas: Vec<EnrichedMetadata> = ctx.candidates.iter().map(|c| c.metadata.clone()).collect();
        let pairs: Vec<(String, EnrichedMetadata)> =
            ctx.candidates.iter().map(|c| (c.candidate_name.clone(), c.metadata.clone())).collect();
        Structure::TeamBuild {
            composition: team::composition(&metadatas),
            synergy: team::synergy(&metadatas),
            team_risk: team::team_risk(&pairs),
            members: team::member_cards(&pairs),
        }
    }

    fn risk_assessment(ctx: &StructureContext<'_>) -> Structure {
        let assessments = ctx
            .candidates
            .iter()
            .map(|c| risk::assess(&c.cv_id, &c.candidate_name, &c.metadata))
            .collect();
        Structure::RiskAssessment { assessments }
    }

    fn red_flags(ctx: &StructureContext<'_>) -> Structure {
        let pairs: Vec<(String, EnrichedMetadata)> =
            ctx.candidates.iter().map(|c| (c.candidate_name.clone(), c.metadata.clone())).collect();
        Structure::RedFlags { flags: crate::modules::red_flags::collect(&pairs) }
    }

    fn verification(ctx: &StructureContext<'_>) -> Structure {
        let info = ctx.verification.cloned().unwrap_or(VerificationInfo {
            groundedness: None,
            verified_claims: Vec::new(),
            ungrounded_claims: Vec::new(),
            heuristic_confidence: 0.0,
            unverified_cv_ids: Vec::new(),
            combined_confidence: 0.0,
            warning: None,
        });
        let verdict = verdict::derive(&info);
        let conclusion = conflict_fixed_conclusion(verdict, ctx.structured_output.conclusion.as_deref());
        Structure::Verification { verdict, conclusion, info }
    }

    fn summary(ctx: &StructureContext<'_>) -> Structure {
        let metadatas: Vec<EnrichedMetadata> = ctx.candidates.iter().map(|c| c.metadata.clone()).collect();
        let distribution = skill::distribution(&metadatas);
        let experience = timeline::experience_distribution(&metadatas);
        Structure::Summary {
            candidate_count: ctx.candidates.len(),
            skill_distribution: distribution,
            experience_distribution: experience.into_iter().map(|(label, count)| (label.to_string(), count)).collect(),
        }
    }

    fn adaptive(ctx: &StructureContext<'_>) -> Structure {
        let pairs: Vec<(String, EnrichedMetadata)> =
            ctx.candidates.iter().map(|c| (c.candidate_name.clone(), c.metadata.clone())).collect();
        Structure::Adaptive { table: crate::modules::adaptive::build(ctx.query, &pairs) }
    }
}

fn candidate_triples(candidates: &[CandidateContext]) -> Vec<(String, String, EnrichedMetadata)> {
    candidates
        .iter()
        .map(|c| (c.cv_id.clone(), c.candidate_name.clone(), c.metadata.clone()))
        .collect()
}

fn score_all(ctx: &StructureContext<'_>) -> Vec<CandidateScore> {
    ctx.candidates
        .iter()
        .filter_map(|c| {
            ScoringService::score(&c.cv_id, &c.candidate_name, &c.metadata, ctx.scoring_profile, ctx.requirements).ok()
        })
        .collect()
}

fn neutral_score(cv_id: &str, name: &str) -> CandidateScore {
    CandidateScore {
        cv_id: cv_id.to_string(),
        candidate_name: name.to_string(),
        overall: 0.0,
        grade: crate::scoring::Grade::F,
        criteria: Vec::new(),
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        recommendation: "No candidate data available.".to_string(),
    }
}

fn default_ranking_criteria() -> Vec<RankingCriterion> {
    vec![
        RankingCriterion { name: "Experience".to_string(), weight: 0.3 },
        RankingCriterion { name: "Skills".to_string(), weight: 0.3 },
        RankingCriterion { name: "Stability".to_string(), weight: 0.2 },
        RankingCriterion { name: "Career Trajectory".to_string(), weight: 0.2 },
    ]
}

/// Rewrites an affirmative-sounding conclusion when the derived verdict
/// says the claim wasn't actually grounded (spec §9 / DESIGN.md Open
/// Question 2). Applied even when the LLM's own conclusion insists
/// otherwise — computed verification data wins.
fn conflict_fixed_conclusion(verdict: Verdict, llm_conclusion: Option<&str>) -> String {
    match verdict {
        Verdict::NotFound => {
            "Unable to verify this from the indexed résumés — no supporting evidence was found.".to_string()
        }
        Verdict::Contradicted => {
            "Unable to confirm this claim — the retrieved content contradicts it.".to_string()
        }
        Verdict::Confirmed | Verdict::Partial => {
            llm_conclusion.map(str::to_string).unwrap_or_else(|| "No conclusion was generated.".to_string())
        }
    }
}

/// Regenerates `conclusion`/`analysis` from the ranking table whenever the
/// LLM's text disagrees with the computed top candidate (spec §4.10 / §9 /
/// DESIGN.md Open Question 2) — the same computed-wins rule
/// `conflict_fixed_conclusion` applies to verification, applied here to
/// ranking's own pair of LLM-narrated fields.
fn ranking_conclusion_and_analysis(
    ranked: &[RankedCandidate],
    top_pick: Option<&TopPick>,
    llm_conclusion: Option<&str>,
    llm_analysis: Option<&str>,
) -> (String, String) {
    let computed_analysis = || {
        ranked
            .iter()
            .map(|c| format!("- {} — {:.0}/100", c.candidate_name, c.overall))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let computed_conclusion = |pick: &TopPick| {
        format!("Top pick: **{}** with an overall score of {:.0}/100.", pick.candidate_name, pick.overall_score)
    };

    match top_pick {
        None => (
            llm_conclusion.map(str::to_string).unwrap_or_else(|| "No candidates were available to rank.".to_string()),
            llm_analysis.map(str::to_string).unwrap_or_default(),
        ),
        Some(pick) => {
            let llm_agrees = llm_conclusion.is_some_and(|text| text.contains(&pick.candidate_name));
            if llm_agrees {
                (
                    llm_conclusion.unwrap().to_string(),
                    llm_analysis.map(str::to_string).unwrap_or_else(computed_analysis),
                )
            } else {
                (computed_conclusion(pick), computed_analysis())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_types::QueryType;

    fn ctx<'a>(candidates: &'a [CandidateContext], output: &'a StructuredOutput, profile: &'a ScoringProfile) -> StructureContext<'a> {
        StructureContext {
            candidates,
            search_results: &[],
            requirements: &[],
            scoring_profile: profile,
            verification: None,
            structured_output: output,
            query: "",
        }
    }

    #[test]
    fn ranking_top_pick_matches_highest_overall() {
        let candidates = vec![
            CandidateContext { cv_id: "cv1".into(), candidate_name: "Weak".into(), metadata: EnrichedMetadata::default() },
            CandidateContext {
                cv_id: "cv2".into(),
                candidate_name: "Strong".into(),
                metadata: EnrichedMetadata { total_experience_years: 12.0, skills: vec!["rust".into(); 12], ..Default::default() },
            },
        ];
        let output = StructuredOutput::default();
        let profile = crate::scoring::default_profile();
        let structure = StructureRouter::route(QueryType::Ranking, &ctx(&candidates, &output, &profile));
        if let Structure::Ranking { ranked, top_pick, .. } = structure {
            let best = ranked.iter().max_by(|a, b| a.overall.partial_cmp(&b.overall).unwrap()).unwrap();
            assert_eq!(top_pick.unwrap().candidate_name, best.candidate_name);
        } else {
            panic!("expected Ranking structure");
        }
    }

    #[test]
    fn ranking_conclusion_is_regenerated_when_llm_names_a_different_winner() {
        let candidates = vec![
            CandidateContext { cv_id: "cv1".into(), candidate_name: "Weak".into(), metadata: EnrichedMetadata::default() },
            CandidateContext {
                cv_id: "cv2".into(),
                candidate_name: "Strong".into(),
                metadata: EnrichedMetadata { total_experience_years: 12.0, skills: vec!["rust".into(); 12], ..Default::default() },
            },
        ];
        let output = StructuredOutput {
            conclusion: Some("Weak is clearly the best fit for this role.".to_string()),
            ..Default::default()
        };
        let profile = crate::scoring::default_profile();
        let structure = StructureRouter::route(QueryType::Ranking, &ctx(&candidates, &output, &profile));
        if let Structure::Ranking { conclusion, top_pick, .. } = structure {
            let pick = top_pick.unwrap();
            assert_eq!(pick.candidate_name, "Strong");
            assert!(conclusion.contains("Strong"));
            assert!(!conclusion.contains("Weak is clearly"));
        } else {
            panic!("expected Ranking structure");
        }
    }

    #[test]
    fn ranking_conclusion_keeps_llm_text_when_it_agrees() {
        let candidates = vec![
            CandidateContext { cv_id: "cv1".into(), candidate_name: "Weak".into(), metadata: EnrichedMetadata::default() },
            CandidateContext {
                cv_id: "cv2".into(),
                candidate_name: "Strong".into(),
                metadata: EnrichedMetadata { total_experience_years: 12.0, skills: vec!["rust".into(); 12], ..Default::default() },
            },
        ];
        let output = StructuredOutput {
            conclusion: Some("Strong is clearly the best fit for this role.".to_string()),
            ..Default::default()
        };
        let profile = crate::scoring::default_profile();
        let structure = StructureRouter::route(QueryType::Ranking, &ctx(&candidates, &output, &profile));
        if let Structure::Ranking { conclusion, .. } = structure {
            assert_eq!(conclusion, "Strong is clearly the best fit for this role.");
        } else {
            panic!("expected Ranking structure");
        }
    }

    #[test]
    fn verification_rewrites_conclusion_on_not_found() {
        let output = StructuredOutput {
            conclusion: Some("Yes, Jane definitely has this certification.".to_string()),
            ..Default::default()
        };
        let profile = crate::scoring::default_profile();
        let structure = StructureRouter::route(QueryType::Verification, &ctx(&[], &output, &profile));
        if let Structure::Verification { verdict, conclusion, .. } = structure {
            assert_eq!(verdict, Verdict::NotFound);
            assert!(!conclusion.contains("definitely"));
        } else {
            panic!("expected Verification structure");
        }
    }

    #[test]
    fn adaptive_structure_picks_columns_from_the_query() {
        let candidates = vec![CandidateContext {
            cv_id: "cv1".into(),
            candidate_name: "Jane".into(),
            metadata: EnrichedMetadata { languages: vec!["French".into()], ..Default::default() },
        }];
        let output = StructuredOutput::default();
        let profile = crate::scoring::default_profile();
        let mut c = ctx(&candidates, &output, &profile);
        c.query = "What languages do candidates speak?";
        let structure = StructureRouter::route(QueryType::Initial, &c);
        if let Structure::Adaptive { table } = structure {
            assert_eq!(table.columns, vec!["Candidate".to_string(), "Languages".to_string()]);
            assert_eq!(table.rows.len(), 1);
        } else {
            panic!("expected Adaptive structure");
        }
    }
}
