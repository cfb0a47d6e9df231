//! Reranker (C7)
//!
//! Optional LLM-scored re-sort of retrieved chunks. Never truncates — later
//! pipeline stages still see the full retrieved set, just reordered. Falls
//! back to passing the input through unchanged if reranking is disabled or
//! the LLM call fails (spec §4.6).

use std::sync::Arc;
use std::time::Instant;

use tracing::{instrument, warn};

use cv_models::Reranker;
use cv_types::SearchResult;

/// Metrics captured for a rerank pass, surfaced in `StageMetrics` (C15).
#[derive(Debug, Clone, Default)]
pub struct RerankMetrics {
    pub applied: bool,
    pub model_id: Option<String>,
    pub latency_ms: u64,
}

pub struct LlmReranker {
    reranker: Option<Arc<dyn Reranker>>,
}

impl LlmReranker {
    pub fn new(reranker: Arc<dyn Reranker>) -> Self {
        Self {
            reranker: Some(reranker),
        }
    }

    /// A reranker that always passes results through unchanged — used when
    /// reranking is disabled in configuration.
    pub fn disabled() -> Self {
        Self { reranker: None }
    }

    #[instrument(skip(self, query, results))]
    pub async fn rerank(
        &self,
        query: &str,
        results: Vec<SearchResult>,
    ) -> (Vec<SearchResult>, RerankMetrics) {
        let Some(reranker) = &self.reranker else {
            return (results, RerankMetrics::default());
        };

        if results.is_empty() {
            return (results, RerankMetrics::default());
        }

        let start = Instant::now();
        match reranker.score(query, &results).await {
            Ok(mut scores) => {
                scores.sort_by(|a, b| {
                    b.relevance
                        .partial_cmp(&a.relevance)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                let reordered: Vec<SearchResult> = scores
                    .into_iter()
                    .filter_map(|s| results.get(s.index).cloned())
                    .collect();

                let metrics = RerankMetrics {
                    applied: true,
                    model_id: Some(reranker.model_id().to_string()),
                    latency_ms: start.elapsed().as_millis() as u64,
                };
                (reordered, metrics)
            }
            Err(e) => {
                warn!("reranker call failed, passing results through unchanged: {e}");
                (results, RerankMetrics::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cv_models::{ModelResult, RerankScore};

    fn sample_result(cv_id: &str, similarity: f32) -> SearchResult {
        SearchResult {
            cv_id: cv_id.to_string(),
            chunk_id: format!("{cv_id}-chunk"),
            section_type: cv_types::SectionType::Experience,
            content: "worked with rust".to_string(),
            metadata: cv_types::EnrichedMetadata::default(),
            similarity,
            filename: format!("{cv_id}.pdf"),
        }
    }

    struct ReverseReranker;

    #[async_trait]
    impl Reranker for ReverseReranker {
        async fn score(
            &self,
            _query: &str,
            results: &[SearchResult],
        ) -> ModelResult<Vec<RerankScore>> {
            Ok((0..results.len())
                .rev()
                .enumerate()
                .map(|(relevance_rank, index)| RerankScore {
                    index,
                    relevance: relevance_rank as f32,
                })
                .collect())
        }

        fn model_id(&self) -> &str {
            "reverse-test"
        }
    }

    struct FailingReranker;

    #[async_trait]
    impl Reranker for FailingReranker {
        async fn score(
            &self,
            _query: &str,
            _results: &[SearchResult],
        ) -> ModelResult<Vec<RerankScore>> {
            Err(cv_models::ModelError::InferenceError("boom".into()))
        }

        fn model_id(&self) -> &str {
            "failing-test"
        }
    }

    #[tokio::test]
    async fn disabled_reranker_passes_through() {
        let reranker = LlmReranker::disabled();
        let results = vec![sample_result("a", 0.9), sample_result("b", 0.8)];
        let (out, metrics) = reranker.rerank("query", results.clone()).await;
        assert_eq!(out.len(), 2);
        assert!(!metrics.applied);
    }

    #[tokio::test]
    async fn reorders_without_truncating() {
        let reranker = LlmReranker::new(Arc::new(ReverseReranker));
        let results = vec![
            sample_result("a", 0.9),
            sample_result("b", 0.8),
            sample_result("c", 0.7),
        ];
        let (out, metrics) = reranker.rerank("query", results).await;
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].cv_id, "c");
        assert!(metrics.applied);
    }

    #[tokio::test]
    async fn failed_call_passes_through_unchanged() {
        let reranker = LlmReranker::new(Arc::new(FailingReranker));
        let results = vec![sample_result("a", 0.9), sample_result("b", 0.8)];
        let (out, metrics) = reranker.rerank("query", results).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].cv_id, "a");
        assert!(!metrics.applied);
    }
}
