//! Integration tests for the concrete scenarios named in spec §8, driven
//! through the public `StructureRouter` entry point rather than individual
//! modules, so they exercise the same path `cv-core`'s orchestrator does.

use cv_output::{CandidateContext, Structure, StructureContext, StructureRouter};
use cv_types::{EnrichedMetadata, QueryType, StructuredOutput, VerificationInfo};

fn ctx<'a>(
    candidates: &'a [CandidateContext],
    output: &'a StructuredOutput,
    profile: &'a cv_types::ScoringProfile,
    verification: Option<&'a VerificationInfo>,
) -> StructureContext<'a> {
    StructureContext {
        candidates,
        search_results: &[],
        requirements: &[],
        scoring_profile: profile,
        verification,
        structured_output: output,
        query: "",
    }
}

/// Confirm Alice has an AWS certification — no certification metadata, no
/// AWS token anywhere in Alice's chunks. Verifier has nothing to ground the
/// claim on: NOT_FOUND, confidence ~0.3, conclusion starts with "Unable to
/// verify".
#[test]
fn verification_scenario_aws_certification_not_found() {
    let info = VerificationInfo {
        groundedness: None,
        verified_claims: Vec::new(),
        ungrounded_claims: Vec::new(),
        heuristic_confidence: 0.3,
        unverified_cv_ids: vec!["cv_alice".to_string()],
        combined_confidence: 0.3,
        warning: None,
    };
    let output = StructuredOutput {
        conclusion: Some("Yes, Alice's AWS certification is confirmed.".to_string()),
        ..Default::default()
    };
    let profile = cv_output::scoring::default_profile();
    let structure = StructureRouter::route(
        QueryType::Verification,
        &ctx(&[], &output, &profile, Some(&info)),
    );

    match structure {
        Structure::Verification { verdict, conclusion, .. } => {
            assert_eq!(verdict, cv_output::modules::verdict::Verdict::NotFound);
            assert!(conclusion.starts_with("Unable to verify"));
        }
        other => panic!("expected Verification structure, got {other:?}"),
    }
}

/// Python required, AWS preferred; candidate mentions Python and docker but
/// not AWS. met=[Python], missing=[AWS], overall ~50%. Routed through the
/// `SingleCandidate` structure, the only one that surfaces `match_score`'s
/// per-requirement breakdown directly.
#[test]
fn job_match_scenario_python_required_aws_missing() {
    let candidates = vec![CandidateContext {
        cv_id: "cv_1".into(),
        candidate_name: "Sam".into(),
        metadata: EnrichedMetadata {
            skills: vec!["Python".into(), "Docker".into()],
            ..Default::default()
        },
    }];
    let requirements = vec!["Python".to_string(), "AWS".to_string()];
    let output = StructuredOutput::default();
    let profile = cv_output::scoring::default_profile();
    let structure_ctx = StructureContext {
        candidates: &candidates,
        search_results: &[],
        requirements: &requirements,
        scoring_profile: &profile,
        verification: None,
        structured_output: &output,
        query: "",
    };
    let structure = StructureRouter::route(QueryType::SingleCandidate, &structure_ctx);

    match structure {
        Structure::SingleCandidate { match_score, .. } => {
            use cv_output::modules::match_score::RequirementStatus;
            let met: Vec<&str> = match_score
                .requirements
                .iter()
                .filter(|r| r.status == RequirementStatus::Met)
                .map(|r| r.requirement.as_str())
                .collect();
            let missing: Vec<&str> = match_score
                .requirements
                .iter()
                .filter(|r| r.status == RequirementStatus::Missing)
                .map(|r| r.requirement.as_str())
                .collect();
            assert_eq!(met, vec!["Python"]);
            assert_eq!(missing, vec!["AWS"]);
            assert!((match_score.overall_percent - 50.0).abs() < 1.0);
        }
        other => panic!("expected SingleCandidate structure, got {other:?}"),
    }
}

/// "What languages do candidates speak?" over three CVs with
/// [English,French], [English], [Spanish]: columns [Candidate, Languages],
/// one row per CV, distribution {English:2, French:1, Spanish:1}.
#[test]
fn adaptive_scenario_language_distribution() {
    let candidates = vec![
        CandidateContext {
            cv_id: "cv_1".into(),
            candidate_name: "Amir".into(),
            metadata: EnrichedMetadata { languages: vec!["English".into(), "French".into()], ..Default::default() },
        },
        CandidateContext {
            cv_id: "cv_2".into(),
            candidate_name: "Bea".into(),
            metadata: EnrichedMetadata { languages: vec!["English".into()], ..Default::default() },
        },
        CandidateContext {
            cv_id: "cv_3".into(),
            candidate_name: "Cleo".into(),
            metadata: EnrichedMetadata { languages: vec!["Spanish".into()], ..Default::default() },
        },
    ];
    let output = StructuredOutput::default();
    let profile = cv_output::scoring::default_profile();
    let mut structure_ctx = ctx(&candidates, &output, &profile, None);
    structure_ctx.query = "What languages do candidates speak?";
    let structure = StructureRouter::route(QueryType::Initial, &structure_ctx);

    match structure {
        Structure::Adaptive { table } => {
            assert_eq!(table.columns, vec!["Candidate".to_string(), "Languages".to_string()]);
            assert_eq!(table.rows.len(), 3);
            let dist: std::collections::HashMap<String, u32> = table.distribution.into_iter().collect();
            assert_eq!(dist.get("English"), Some(&2));
            assert_eq!(dist.get("French"), Some(&1));
            assert_eq!(dist.get("Spanish"), Some(&1));
        }
        other => panic!("expected Adaptive structure, got {other:?}"),
    }
}
