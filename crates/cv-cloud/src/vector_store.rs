//! Supabase-backed [`cv_models::VectorStore`] (C1, cloud mode).
//!
//! Talks to a Postgres project with the `pgvector` extension through
//! Supabase's PostgREST interface: `chunks` is a plain table upserted via
//! `Prefer: resolution=merge-duplicates`, and similarity search goes
//! through a `match_chunks` RPC function (the `<=>` cosine-distance
//! operator isn't expressible as a REST filter). Mirrors the table/column
//! naming `cv-knowledge::vault::SqliteVectorStore` uses locally so the two
//! providers stay swappable without touching callers.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cv_models::{EmbeddedChunk, ModelResult, VectorStore, VectorStoreStats};
use cv_types::{EnrichedMetadata, SearchResult, SectionType};

use crate::error::{CloudError, CloudResult};

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

pub struct SupabaseVectorStore {
    client: Client,
    base_url: String,
    service_key: String,
    embedding_dimensions: u32,
}

impl SupabaseVectorStore {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>, embedding_dimensions: u32) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            service_key: service_key.into(),
            embedding_dimensions,
        }
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{path}", self.base_url.trim_end_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.rest_url(path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Content-Type", "application/json")
    }

    async fn error_from_response(response: reqwest::Response) -> CloudError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        CloudError::api(status, body)
    }
}

#[async_trait]
impl VectorStore for SupabaseVectorStore {
    #[instrument(skip(self, documents))]
    async fn add_documents(&self, documents: Vec<EmbeddedChunk>) -> ModelResult<()> {
        let rows: Vec<ChunkRow> = documents
            .into_iter()
            .map(|doc| ChunkRow {
                chunk_id: doc.chunk.chunk_id,
                cv_id: doc.chunk.cv_id,
                chunk_index: doc.chunk.chunk_index,
                section_type: section_type_to_str(doc.chunk.section_type).to_string(),
                content: doc.chunk.content,
                metadata: doc.chunk.metadata,
                embedding: doc.embedding,
            })
            .collect();

        if rows.is_empty() {
            return Ok(());
        }

        let response = self
            .request(reqwest::Method::POST, "chunks")
            .header("Prefer", "resolution=merge-duplicates")
            .json(&rows)
            .send()
            .await
            .map_err(CloudError::Http)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await.into());
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
        let fetch_n = if cv_ids.is_some() || diversify_by_cv {
            (k * 5).max(k)
        } else {
            k
        };

        let rpc_body = MatchChunksRequest {
            query_embedding: query_embedding.to_vec(),
            match_count: fetch_n,
            match_threshold: threshold,
            filter_cv_ids: cv_ids.map(|ids| ids.to_vec()),
        };

        let response = self
            .request(reqwest::Method::POST, "rpc/match_chunks")
            .json(&rpc_body)
            .send()
            .await
            .map_err(CloudError::Http)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await.into());
        }

        let matches: Vec<MatchChunkRow> = response.json().await.map_err(CloudError::Http)?;

        let mut results = Vec::new();
        let mut per_cv_count: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        let distinct_cvs: std::collections::HashSet<&String> = matches.iter().map(|m| &m.cv_id).collect();
        let max_per_cv = if diversify_by_cv && !distinct_cvs.is_empty() {
            (k / distinct_cvs.len()).max(1)
        } else {
            usize::MAX
        };

        for row in matches {
            if diversify_by_cv {
                let count = per_cv_count.entry(row.cv_id.clone()).or_insert(0);
                if *count >= max_per_cv {
                    continue;
                }
                *count += 1;
            }

            results.push(SearchResult {
                cv_id: row.cv_id,
                chunk_id: row.chunk_id,
                section_type: section_type_from_str(&row.section_type),
                content: row.content,
                metadata: row.metadata,
                similarity: row.similarity,
                filename: row.filename,
            });

            if results.len() >= k {
                break;
            }
        }

        Ok(results)
    }

    async fn get_stats(&self) -> ModelResult<VectorStoreStats> {
        let response = self
            .request(reqwest::Method::GET, "rpc/chunk_store_stats")
            .send()
            .await
            .map_err(CloudError::Http)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await.into());
        }

        let stats: StatsRow = response.json().await.map_err(CloudError::Http)?;
        Ok(VectorStoreStats {
            cv_count: stats.cv_count,
            chunk_count: stats.chunk_count,
            embedding_dimensions: self.embedding_dimensions,
        })
    }

    async fn delete_by_cv_id(&self, cv_id: &str) -> ModelResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, "chunks")
            .query(&[("cv_id", format!("eq.{cv_id}"))])
            .send()
            .await
            .map_err(CloudError::Http)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await.into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ChunkRow {
    chunk_id: String,
    cv_id: String,
    chunk_index: u32,
    section_type: String,
    content: String,
    metadata: EnrichedMetadata,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct MatchChunksRequest {
    query_embedding: Vec<f32>,
    match_count: usize,
    match_threshold: f32,
    filter_cv_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct MatchChunkRow {
    chunk_id: String,
    cv_id: String,
    section_type: String,
    content: String,
    #[serde(default)]
    metadata: EnrichedMetadata,
    similarity: f32,
    filename: String,
}

#[derive(Debug, Deserialize)]
struct StatsRow {
    cv_count: u64,
    chunk_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_type_round_trips_through_its_string_form() {
        for section_type in [
            SectionType::Summary,
            SectionType::Experience,
            SectionType::Skills,
            SectionType::Education,
            SectionType::Certifications,
            SectionType::FullCv,
            SectionType::General,
        ] {
            let s = section_type_to_str(section_type);
            assert_eq!(section_type_from_str(s), section_type);
        }
    }

    #[test]
    fn rest_url_strips_trailing_slash_from_base() {
        let store = SupabaseVectorStore::new("https://project.supabase.co/", "key", 384);
        assert_eq!(store.rest_url("chunks"), "https://project.supabase.co/rest/v1/chunks");
    }
}
