//! Retrieval Engine (C6)
//!
//! Adaptive vector search on top of a `cv_models::VectorStore`: given the
//! query type and the session's total CV count, picks `k`, `threshold` and
//! whether to diversify results across `cv_id`s (spec §4.5). The actual
//! per-cv_id cap is applied by the store implementation, which is the only
//! layer that sees the full candidate pool before truncating to `k`.

use std::sync::Arc;

use tracing::{instrument, warn};

use cv_models::{Embedder, VectorStore};
use cv_types::{QueryType, SearchResult};

use crate::{KnowledgeError, KnowledgeResult};

/// Resolved parameters for a single retrieval call, after the adaptive
/// strategy (spec §4.5) has been applied.
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    pub k: usize,
    pub threshold: f32,
    pub diversify_by_cv: bool,
    pub cv_ids: Option<Vec<String>>,
}

impl RetrievalOptions {
    /// Works out `k`/`threshold`/`diversify_by_cv` from the query type and
    /// the session's total CV count, per the adaptive strategy table.
    ///
    /// `configured_k` is the operator-configured default `k` used for the
    /// non-ranking, large-session branch (spec §4.5, third bullet).
    pub fn adaptive(
        query_type: QueryType,
        total_cvs_in_session: usize,
        configured_k: usize,
        configured_threshold: f32,
        cv_ids: Option<Vec<String>>,
    ) -> Self {
        let n = total_cvs_in_session;

        let (k, diversify_by_cv) = if query_type.is_ranking_like() {
            let cap = if n > 100 { 30 } else { 100 };
            (n.min(cap).max(1), true)
        } else if n < 100 {
            (n.max(1), true)
        } else {
            (configured_k, false)
        };

        let threshold = if n > 100 {
            (configured_threshold - 0.10).max(0.05)
        } else {
            configured_threshold
        };

        Self {
            k,
            threshold,
            diversify_by_cv,
            cv_ids,
        }
    }
}

/// Adaptive retrieval on top of an embedder and a vector store.
pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl RetrievalEngine {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    #[instrument(skip(self, text))]
    pub async fn embed_query(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
        let batch = self.embedder.embed_query(text).await?;
        batch
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| KnowledgeError::Internal("embedder returned no vector".to_string()))
    }

    /// Runs the vector search. Per-cv_id diversification (spec §4.5: at
    /// most `M ≈ ⌈k/|cv_ids|⌉` chunks per cv_id) is applied by the
    /// `VectorStore` implementation itself when `diversify_by_cv` is set —
    /// this is storage-layer behavior, since only the store can see the
    /// full candidate pool before truncating to `k`.
    #[instrument(skip(self, query_embedding))]
    pub async fn search(
        &self,
        query_embedding: &[f32],
        options: &RetrievalOptions,
    ) -> KnowledgeResult<Vec<SearchResult>> {
        let results = self
            .store
            .search(
                query_embedding,
                options.k,
                options.threshold,
                options.cv_ids.as_deref(),
                options.diversify_by_cv,
            )
            .await?;

        if results.is_empty() {
            warn!("retrieval returned no hits above threshold {}", options.threshold);
        }

        Ok(results)
    }

    /// Convenience: embed then search in one call.
    pub async fn search_text(
        &self,
        query: &str,
        options: &RetrievalOptions,
    ) -> KnowledgeResult<Vec<SearchResult>> {
        let embedding = self.embed_query(query).await?;
        self.search(&embedding, options).await
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_query_diversifies_with_capped_k() {
        let opts = RetrievalOptions::adaptive(QueryType::Ranking, 150, 20, 0.5, None);
        assert!(opts.diversify_by_cv);
        assert_eq!(opts.k, 30);
        assert!((opts.threshold - 0.4).abs() < 0.001);
    }

    #[test]
    fn ranking_query_small_session_uses_full_count() {
        let opts = RetrievalOptions::adaptive(QueryType::Comparison, 40, 20, 0.5, None);
        assert!(opts.diversify_by_cv);
        assert_eq!(opts.k, 40);
        assert!((opts.threshold - 0.5).abs() < 0.001);
    }

    #[test]
    fn non_ranking_small_session_diversifies_with_full_count() {
        let opts = RetrievalOptions::adaptive(QueryType::SingleCandidate, 12, 20, 0.5, None);
        assert!(opts.diversify_by_cv);
        assert_eq!(opts.k, 12);
    }

    #[test]
    fn non_ranking_large_session_uses_configured_k_no_diversify() {
        let opts = RetrievalOptions::adaptive(QueryType::Search, 500, 25, 0.5, None);
        assert!(!opts.diversify_by_cv);
        assert_eq!(opts.k, 25);
        assert!((opts.threshold - 0.4).abs() < 0.001);
    }

    #[test]
    fn threshold_floor_is_respected() {
        let opts = RetrievalOptions::adaptive(QueryType::Search, 500, 25, 0.1, None);
        assert!((opts.threshold - 0.05).abs() < 0.001);
    }
}
