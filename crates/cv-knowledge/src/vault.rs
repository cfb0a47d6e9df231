//! SQLite-backed [`cv_models::VectorStore`] implementation (C1, local mode).
//!
//! Stores one row per indexed CV and one row per chunk/embedding, with a
//! VSS virtual table fast path and a manual cosine-similarity fallback when
//! the `sqlite-vss` extension isn't loaded.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use cv_models::{EmbeddedChunk, ModelResult, VectorStore, VectorStoreStats};
use cv_types::{Cv, EnrichedMetadata, SearchResult, SectionType};

use crate::{KnowledgeError, KnowledgeResult};

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn section_type_to_str(section_type: SectionType) -> &'static str {
    match section_type {
        SectionType::Summary => "summary",
        SectionType::Experience => "experience",
        SectionType::Skills => "skills",
        SectionType::Education => "education",
        SectionType::Certifications => "certifications",
        SectionType::FullCv => "full_cv",
        SectionType::General => "general",
    }
}

fn section_type_from_str(s: &str) -> SectionType {
    match s {
        "summary" => SectionType::Summary,
        "experience" => SectionType::Experience,
        "skills" => SectionType::Skills,
        "education" => SectionType::Education,
        "certifications" => SectionType::Certifications,
        "full_cv" => SectionType::FullCv,
        _ => SectionType::General,
    }
}

/// SQLite storage for CVs, chunks and embeddings, behind a tokio mutex
/// since `rusqlite::Connection` is not `Sync`.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    embedding_dimensions: u32,
}

impl SqliteVectorStore {
    #[instrument(skip_all)]
    pub fn open(path: &Path, embedding_dimensions: u32) -> KnowledgeResult<Self> {
        info!("opening vector store at {:?}", path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
            embedding_dimensions,
        };
        store.init_schema_sync()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn in_memory(embedding_dimensions: u32) -> KnowledgeResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
            embedding_dimensions,
        };
        store.init_schema_sync()?;
        Ok(store)
    }

    fn init_schema_sync(&self) -> KnowledgeResult<()> {
        let conn = self.conn.blocking_lock();
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS cvs (
                cv_id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                candidate_name TEXT,
                indexed_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                chunk_id TEXT PRIMARY KEY,
                cv_id TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                section_type TEXT NOT NULL,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL,
                FOREIGN KEY (cv_id) REFERENCES cvs(cv_id) ON DELETE CASCADE
            )
            "#,
            [],
        )?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS embeddings (
                chunk_id TEXT PRIMARY KEY,
                embedding BLOB NOT NULL,
                FOREIGN KEY (chunk_id) REFERENCES chunks(chunk_id) ON DELETE CASCADE
            )
            "#,
            [],
        )?;

        if let Err(e) = create_vss_table(&conn, self.embedding_dimensions) {
            debug!("VSS table creation failed (extension not loaded): {e}");
            debug!("falling back to manual cosine similarity search");
        }

        conn.execute("CREATE INDEX IF NOT EXISTS idx_chunks_cv ON chunks(cv_id)", [])?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cvs_hash ON cvs(content_hash)",
            [],
        )?;
        Ok(())
    }

    /// Registers a CV's identity (filename, content hash) ahead of indexing
    /// its chunks. Not part of the `VectorStore` trait since providers other
    /// than the local SQLite one may have no equivalent notion.
    #[instrument(skip(self, cv))]
    pub async fn add_cv(&self, cv: &Cv, content_hash: &str) -> KnowledgeResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"
            INSERT INTO cvs (cv_id, filename, content_hash, candidate_name, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(cv_id) DO UPDATE SET
                filename = excluded.filename,
                content_hash = excluded.content_hash,
                candidate_name = excluded.candidate_name
            "#,
            params![
                cv.cv_id,
                cv.filename,
                content_hash,
                cv.candidate_name,
                cv.indexed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub async fn has_content_hash(&self, hash: &str) -> KnowledgeResult<bool> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cvs WHERE content_hash = ?1",
            params![hash],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn filename_for(conn: &Connection, cv_id: &str) -> KnowledgeResult<String> {
        conn.query_row(
            "SELECT filename FROM cvs WHERE cv_id = ?1",
            params![cv_id],
            |row| row.get(0),
        )
        .optional()
        .map(|f| f.unwrap_or_default())
        .map_err(KnowledgeError::from)
    }

    fn search_vss(
        conn: &Connection,
        query_embedding: &[f32],
        fetch_n: usize,
    ) -> KnowledgeResult<Vec<(String, String, f32)>> {
        let query_str = vss_literal(query_embedding);
        let sql = r#"
            SELECT c.chunk_id, c.cv_id, vss.distance
            FROM vss_chunks vss
            JOIN chunks c ON vss.vss_chunk_id = c.chunk_id
            WHERE vss.embedding MATCH vss_search(?1)
            ORDER BY vss.distance
            LIMIT ?2
        "#;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![query_str, fetch_n as i64], |row| {
                let distance: f64 = row.get(2)?;
                Ok((row.get(0)?, row.get(1)?, 1.0 - distance as f32))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn search_cosine_sync(
        conn: &Connection,
        query_embedding: &[f32],
        fetch_n: usize,
    ) -> KnowledgeResult<Vec<(String, String, f32)>> {
        let sql = "SELECT c.chunk_id, c.cv_id, e.embedding FROM embeddings e JOIN chunks c ON e.chunk_id = c.chunk_id";
        let mut stmt = conn.prepare(sql)?;
        let mut scored: Vec<(String, String, f32)> = stmt
            .query_map([], |row| {
                let blob: Vec<u8> = row.get(2)?;
                let embedding: Vec<f32> = blob
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect();
                let score = cosine_similarity(query_embedding, &embedding);
                Ok((row.get(0)?, row.get(1)?, score))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        scored.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(fetch_n);
        Ok(scored)
    }

    fn chunk_row(conn: &Connection, chunk_id: &str) -> KnowledgeResult<(String, SectionType, EnrichedMetadata)> {
        conn.query_row(
            "SELECT content, section_type, metadata FROM chunks WHERE chunk_id = ?1",
            params![chunk_id],
            |row| {
                let content: String = row.get(0)?;
                let section_type: String = row.get(1)?;
                let metadata_json: String = row.get(2)?;
                Ok((content, section_type, metadata_json))
            },
        )
        .map_err(KnowledgeError::from)
        .and_then(|(content, section_type, metadata_json)| {
            let metadata: EnrichedMetadata = serde_json::from_str(&metadata_json)
                .map_err(|e| KnowledgeError::DatabaseError(e.to_string()))?;
            Ok((content, section_type_from_str(&section_type), metadata))
        })
    }
}

fn vss_literal(embedding: &[f32]) -> String {
    let mut s = String::from("[");
    for (i, f) in embedding.iter().enumerate() {
        if i > 0 {
            s.push(',');
        }
        s.push_str(&f.to_string());
    }
    s.push(']');
    s
}

fn create_vss_table(conn: &Connection, dimensions: u32) -> KnowledgeResult<()> {
    if dimensions == 0 || dimensions > 10000 {
        return Err(KnowledgeError::InvalidFormat(format!(
            "embedding dimensions must be between 1 and 10000, got {dimensions}"
        )));
    }
    conn.execute(
        &format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS vss_chunks USING vss0(vss_chunk_id TEXT PRIMARY KEY, embedding({dimensions}))"
        ),
        [],
    )?;
    Ok(())
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, documents))]
    async fn add_documents(&self, documents: Vec<EmbeddedChunk>) -> ModelResult<()> {
        let conn = self.conn.lock().await;
        for doc in documents {
            let metadata_json = serde_json::to_string(&doc.chunk.metadata)
                .map_err(|e| KnowledgeError::DatabaseError(e.to_string()))?;
            conn.execute(
                r#"
                INSERT INTO chunks (chunk_id, cv_id, chunk_index, section_type, content, metadata)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(chunk_id) DO UPDATE SET
                    content = excluded.content,
                    metadata = excluded.metadata
                "#,
                params![
                    doc.chunk.chunk_id,
                    doc.chunk.cv_id,
                    doc.chunk.chunk_index,
                    section_type_to_str(doc.chunk.section_type),
                    doc.chunk.content,
                    metadata_json,
                ],
            )
            .map_err(KnowledgeError::from)?;

            let blob: Vec<u8> = doc.embedding.iter().flat_map(|f| f.to_le_bytes()).collect();
            conn.execute(
                "INSERT OR REPLACE INTO embeddings (chunk_id, embedding) VALUES (?1, ?2)",
                params![doc.chunk.chunk_id, blob],
            )
            .map_err(KnowledgeError::from)?;

            if let Err(e) = conn.execute(
                "INSERT OR REPLACE INTO vss_chunks (vss_chunk_id, embedding) VALUES (?1, ?2)",
                params![doc.chunk.chunk_id, vss_literal(&doc.embedding)],
            ) {
                warn!("VSS insert failed, falling back to cosine search for this chunk: {e}");
            }
        }
        Ok(())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        threshold: f32,
        cv_ids: Option<&[String]>,
        diversify_by_cv: bool,
    ) -> ModelResult<Vec<SearchResult>> {
        let conn = self.conn.lock().await;
        // Over-fetch when a cv_id filter or per-cv diversification will
        // trim the candidate set afterwards.
        let fetch_n = if cv_ids.is_some() || diversify_by_cv {
            (k * 5).max(k)
        } else {
            k
        };

        let hits = match Self::search_vss(&conn, query_embedding, fetch_n) {
            Ok(rows) if !rows.is_empty() => rows,
            _ => Self::search_cosine_sync(&conn, query_embedding, fetch_n).map_err(KnowledgeError::from)?,
        };

        let allowed: Option<std::collections::HashSet<&str>> =
            cv_ids.map(|ids| ids.iter().map(|s| s.as_str()).collect());

        let mut results = Vec::new();
        let mut per_cv_count: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        let max_per_cv = if diversify_by_cv && !hits.is_empty() {
            let distinct_cvs: std::collections::HashSet<&String> = hits.iter().map(|(_, cv_id, _)| cv_id).collect();
            (k / distinct_cvs.len().max(1)).max(1)
        } else {
            usize::MAX
        };

        for (chunk_id, cv_id, score) in hits {
            if score < threshold {
                continue;
            }
            if let Some(allowed) = &allowed {
                if !allowed.contains(cv_id.as_str()) {
                    continue;
                }
            }
            if diversify_by_cv {
                let count = per_cv_count.entry(cv_id.clone()).or_insert(0);
                if *count >= max_per_cv {
                    continue;
                }
                *count += 1;
            }

            let (content, section_type, metadata) =
                Self::chunk_row(&conn, &chunk_id).map_err(KnowledgeError::from)?;
            let filename = Self::filename_for(&conn, &cv_id).map_err(KnowledgeError::from)?;

            results.push(SearchResult {
                cv_id,
                chunk_id,
                section_type,
                content,
                metadata,
                similarity: score,
                filename,
            });

            if results.len() >= k {
                break;
            }
        }

        Ok(results)
    }

    async fn get_stats(&self) -> ModelResult<VectorStoreStats> {
        let conn = self.conn.lock().await;
        let cv_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM cvs", [], |row| row.get(0))
            .map_err(KnowledgeError::from)?;
        let chunk_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(KnowledgeError::from)?;
        Ok(VectorStoreStats {
            cv_count: cv_count as u64,
            chunk_count: chunk_count as u64,
            embedding_dimensions: self.embedding_dimensions,
        })
    }

    async fn delete_by_cv_id(&self, cv_id: &str) -> ModelResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM cvs WHERE cv_id = ?1", params![cv_id])
            .map_err(KnowledgeError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_models::EmbeddedChunk;
    use cv_types::Chunk;

    fn sample_chunk(cv_id: &str, embedding: Vec<f32>) -> EmbeddedChunk {
        EmbeddedChunk {
            chunk: Chunk {
                chunk_id: format!("{cv_id}_summary"),
                cv_id: cv_id.to_string(),
                chunk_index: 0,
                section_type: SectionType::Summary,
                content: "Senior Rust engineer".to_string(),
                metadata: EnrichedMetadata::default(),
                embedding: None,
            },
            embedding,
        }
    }

    #[tokio::test]
    async fn add_and_search_round_trips() {
        let store = SqliteVectorStore::in_memory(4).unwrap();
        store
            .add_cv(&Cv::new("cv_1", "file.pdf", "text"), "hash1")
            .await
            .unwrap();
        store
            .add_documents(vec![sample_chunk("cv_1", vec![1.0, 0.0, 0.0, 0.0])])
            .await
            .unwrap();

        let results = store
            .search(&[1.0, 0.0, 0.0, 0.0], 5, 0.5, None, false)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].cv_id, "cv_1");
        assert_eq!(results[0].filename, "file.pdf");
    }

    #[tokio::test]
    async fn threshold_filters_out_dissimilar_chunks() {
        let store = SqliteVectorStore::in_memory(4).unwrap();
        store.add_cv(&Cv::new("cv_1", "f.pdf", "t"), "h").await.unwrap();
        store
            .add_documents(vec![sample_chunk("cv_1", vec![0.0, 1.0, 0.0, 0.0])])
            .await
            .unwrap();

        let results = store
            .search(&[1.0, 0.0, 0.0, 0.0], 5, 0.9, None, false)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn cv_id_filter_restricts_results() {
        let store = SqliteVectorStore::in_memory(4).unwrap();
        store.add_cv(&Cv::new("cv_1", "f1.pdf", "t"), "h1").await.unwrap();
        store.add_cv(&Cv::new("cv_2", "f2.pdf", "t"), "h2").await.unwrap();
        store
            .add_documents(vec![
                sample_chunk("cv_1", vec![1.0, 0.0, 0.0, 0.0]),
                sample_chunk("cv_2", vec![1.0, 0.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        let allowed = vec!["cv_1".to_string()];
        let results = store
            .search(&[1.0, 0.0, 0.0, 0.0], 5, 0.5, Some(&allowed), false)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].cv_id, "cv_1");
    }

    #[tokio::test]
    async fn stats_reflect_inserted_rows() {
        let store = SqliteVectorStore::in_memory(4).unwrap();
        store.add_cv(&Cv::new("cv_1", "f.pdf", "t"), "h").await.unwrap();
        store
            .add_documents(vec![sample_chunk("cv_1", vec![1.0, 0.0, 0.0, 0.0])])
            .await
            .unwrap();

        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.cv_count, 1);
        assert_eq!(stats.chunk_count, 1);
    }
}
