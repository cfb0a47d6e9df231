//! Integration test for the context-resolution scenario named in spec §8.

use cv_core::resolve_query_with_context;
use cv_types::Message;

/// Last assistant message contains a ranking row naming Alice with a
/// cv_id/score pair; the next user query asks for "the top candidate"'s
/// full profile. The resolved query should name Alice and carry cv_abc.
#[test]
fn resolves_top_candidate_reference_to_named_cv() {
    let history = vec![
        Message::user("Who are the strongest candidates?"),
        Message::assistant("[📄](cv:cv_abc) **Alice** 92%\n[📄](cv:cv_def) **Bob** 81%"),
    ];

    let (resolved_query, candidate_name, cv_id) =
        resolve_query_with_context("Give me the full profile of the top candidate", &history);

    assert!(resolved_query.contains("Alice"));
    assert_eq!(candidate_name.as_deref(), Some("Alice"));
    assert_eq!(cv_id.as_deref(), Some("cv_abc"));
}
