//! Ingestion
//!
//! The write side of the pipeline named in spec §2: raw CV text goes
//! through the [`crate::chunker::Chunker`] (C2), the chunks are embedded in
//! one batch call, and the embedded chunks are handed to a
//! `cv_models::VectorStore` (C1) for storage.

use std::sync::Arc;

use tracing::{info, instrument};

use cv_models::{Embedder, EmbeddedChunk, VectorStore};

use crate::chunker::{Chunker, ChunkerConfig};
use crate::KnowledgeResult;

/// Result of ingesting a single CV document.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub cv_id: String,
    pub chunk_count: usize,
}

/// Chunks, embeds and stores one CV document.
pub struct Ingestor {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            chunker: Chunker::new(),
            embedder,
            store,
        }
    }

    pub fn with_chunker_config(
        config: ChunkerConfig,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            chunker: Chunker::with_config(config),
            embedder,
            store,
        }
    }

    #[instrument(skip(self, raw_text), fields(cv_id = %cv_id, filename = %filename))]
    pub async fn ingest(
        &self,
        raw_text: &str,
        cv_id: &str,
        filename: &str,
    ) -> KnowledgeResult<IngestResult> {
        let chunks = self.chunker.chunk(raw_text, cv_id, filename)?;
        if chunks.is_empty() {
            info!("chunking produced no chunks, nothing to index");
            return Ok(IngestResult {
                cv_id: cv_id.to_string(),
                chunk_count: 0,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let batch = self.embedder.embed_texts(&texts).await?;

        let embedded: Vec<EmbeddedChunk> = chunks
            .into_iter()
            .zip(batch.embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding })
            .collect();
        let chunk_count = embedded.len();

        self.store.add_documents(embedded).await?;

        info!(chunk_count, "ingested cv document");
        Ok(IngestResult {
            cv_id: cv_id.to_string(),
            chunk_count,
        })
    }
}
