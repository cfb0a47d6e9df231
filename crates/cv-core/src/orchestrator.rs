//! Orchestrator (C16) — `RagService`
//!
//! Drives the full retrieval-and-answer pipeline (spec §4.13, §2 data
//! flow): context resolution → query understanding (C4) → guardrail (C5)
//! → embed (C1) → adaptive search (C6) → rerank (C7) → generate (C8) →
//! verify (C9) → output parsing + structure assembly (C10-C12) → eval log
//! (C15). Exposes `query()` and `index_documents()`.
//!
//! Each suspension point (embed, search, rerank, generate, verify) runs
//! under an independent deadline (spec §5); reranker/verifier timeouts
//! degrade to pass-through, embed/search/generate timeouts propagate as a
//! failed response with `confidence = 0.0` and `guardrail_passed = true`
//! (spec §5, §7).

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use cv_guardrail::Guardrail;
use cv_models::{Embedder, EmbeddedChunk, Llm, Reranker, VectorStore};
use cv_types::{Mode, QueryUnderstanding, RagResponse, SearchResult, Session, StageMetrics};

use crate::config::RagConfig;
use crate::context::resolve_query_with_context;
use crate::error::{CvError, Result};
use crate::eval_log::{EvalLog, EvalLogRecord};
use crate::generator::Generator;
use crate::query_understanding::QueryUnderstander;
use crate::verifier::Verifier;
use cv_knowledge::{Chunker, LlmReranker, RetrievalEngine, RetrievalOptions};
use cv_output::CandidateContext;

const NO_CV_RELATED_MESSAGE: &str = "I can only answer questions about the indexed candidate \
résumés in this session. Please ask something related to the CVs.";
const NO_RESULTS_MESSAGE: &str = "I couldn't find any relevant information in the indexed résumés \
to answer that question.";
const EVAL_LOG_EXCERPT_CHARS: usize = 500;

/// One document ready to be ingested via `index_documents`.
pub struct DocumentInput {
    pub cv_id: String,
    pub filename: String,
    pub raw_text: String,
}

/// Parameters for a single `query()` call (spec §4.13).
pub struct QueryRequest<'a> {
    pub question: &'a str,
    pub session_id: Option<String>,
    pub history: &'a [cv_types::Message],
    pub cv_ids: Option<Vec<String>>,
    pub total_cvs_in_session: usize,
    pub k: Option<usize>,
    pub threshold: Option<f32>,
}

/// Drives the pipeline; wires C1/C2/C5/C6/C7/C8/C9/C15 together.
pub struct RagService {
    config: RagConfig,
    mode: Mode,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    understanding_llm: Arc<dyn Llm>,
    generation_llm: Arc<dyn Llm>,
    verification_llm: Option<Arc<dyn Llm>>,
    reranker: LlmReranker,
    guardrail: Guardrail,
    eval_log: Arc<EvalLog>,
}

pub struct RagServiceBuilder {
    config: RagConfig,
    mode: Mode,
    embedder: Option<Arc<dyn Embedder>>,
    store: Option<Arc<dyn VectorStore>>,
    understanding_llm: Option<Arc<dyn Llm>>,
    generation_llm: Option<Arc<dyn Llm>>,
    verification_llm: Option<Arc<dyn Llm>>,
    reranker: Option<Arc<dyn Reranker>>,
    guardrail: Option<Guardrail>,
    eval_log_path: String,
}

impl RagServiceBuilder {
    pub fn new(config: RagConfig, mode: Mode) -> Self {
        Self {
            config,
            mode,
            embedder: None,
            store: None,
            understanding_llm: None,
            generation_llm: None,
            verification_llm: None,
            reranker: None,
            guardrail: None,
            eval_log_path: "eval_log.jsonl".to_string(),
        }
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn understanding_llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.understanding_llm = Some(llm);
        self
    }

    pub fn generation_llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.generation_llm = Some(llm);
        self
    }

    pub fn verification_llm(mut self, llm: Arc<dyn Llm>) -> Self {
        self.verification_llm = Some(llm);
        self
    }

    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn guardrail(mut self, guardrail: Guardrail) -> Self {
        self.guardrail = Some(guardrail);
        self
    }

    pub fn eval_log_path(mut self, path: impl Into<String>) -> Self {
        self.eval_log_path = path.into();
        self
    }

    pub fn build(self) -> Result<RagService> {
        let embedder = self
            .embedder
            .ok_or_else(|| CvError::Config("RagServiceBuilder: embedder is required".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| CvError::Config("RagServiceBuilder: store is required".to_string()))?;
        let understanding_llm = self.understanding_llm.ok_or_else(|| {
            CvError::Config("RagServiceBuilder: understanding_llm is required".to_string())
        })?;
        let generation_llm = self.generation_llm.ok_or_else(|| {
            CvError::Config("RagServiceBuilder: generation_llm is required".to_string())
        })?;

        let reranker = match self.reranker {
            Some(r) => LlmReranker::new(r),
            None => LlmReranker::disabled(),
        };

        Ok(RagService {
            config: self.config,
            mode: self.mode,
            embedder,
            store,
            understanding_llm,
            generation_llm,
            verification_llm: self.verification_llm,
            reranker,
            guardrail: self.guardrail.unwrap_or_default(),
            eval_log: Arc::new(EvalLog::new(self.eval_log_path)),
        })
    }
}

impl RagService {
    /// The mode this service was built for (spec §6 `DEFAULT_MODE`).
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current vector store stats, for callers that want to report vault
    /// size without running a query (e.g. `cv status`).
    pub async fn store_stats(&self) -> Result<cv_models::VectorStoreStats> {
        self.store
            .get_stats()
            .await
            .map_err(|e| CvError::VectorStore(e.to_string()))
    }

    /// Chunks, embeds and stores a batch of raw CV documents (spec §2:
    /// `PDF bytes → external extractor → C2 → C1.Embedder → C1.VectorStore`).
    /// Text extraction from PDF bytes is the caller's job; `documents`
    /// carries already-extracted text.
    #[instrument(skip(self, documents))]
    pub async fn index_documents(&self, documents: Vec<DocumentInput>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }
        let chunker = Chunker::new();
        let mut chunks = Vec::new();
        for doc in documents {
            chunks.extend(
                chunker
                    .chunk(&doc.raw_text, &doc.cv_id, &doc.filename)
                    .map_err(|e| CvError::InputInvalid(e.to_string()))?,
            );
        }
        self.index_chunks(chunks).await
    }

    /// Embeds and stores a batch of already-chunked documents. Exposed
    /// separately from [`Self::index_documents`] so callers that already
    /// have `Chunk`s (re-indexing after a chunker config change, tests) can
    /// skip re-chunking.
    #[instrument(skip(self, chunks))]
    pub async fn index_chunks(&self, chunks: Vec<cv_types::Chunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let batch = self.with_timeout("embed", self.config.timeouts.embed, self.embedder.embed_texts(&texts)).await?;

        let embedded: Vec<EmbeddedChunk> = chunks
            .into_iter()
            .zip(batch.embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding })
            .collect();
        let count = embedded.len();
        self.store
            .add_documents(embedded)
            .await
            .map_err(|e| CvError::VectorStore(e.to_string()))?;
        Ok(count)
    }

    /// Runs the full pipeline for one question (spec §4.13).
    #[instrument(skip(self, request))]
    pub async fn query(&self, request: QueryRequest<'_>) -> Result<RagResponse> {
        let total_start = Instant::now();
        let mut metrics = StageMetrics::default();

        // Step 0 (C3): resolve back-references against conversation history.
        let (resolved_question, _name, _cv_id) =
            resolve_query_with_context(request.question, request.history);

        // Step 1 (C4): query understanding.
        let understanding_start = Instant::now();
        let understander = QueryUnderstander::new(self.understanding_llm.as_ref());
        let understanding = match self
            .with_timeout(
                "understanding",
                self.config.timeouts.understanding,
                understander.understand(&resolved_question),
            )
            .await
        {
            Ok(u) => u,
            Err(e) => return Ok(self.propagate_error_response(e, QueryUnderstanding::rejected(request.question))),
        };
        metrics.understanding_ms = understanding_start.elapsed().as_millis() as u64;

        // Step 2 (C5): guardrail.
        let guardrail_start = Instant::now();
        let verdict = self.guardrail.check(&resolved_question, understanding.is_cv_related);
        metrics.guardrail_ms = guardrail_start.elapsed().as_millis() as u64;
        if !verdict.passed {
            let message = verdict.rejection_message.unwrap_or_else(|| NO_CV_RELATED_MESSAGE.to_string());
            metrics.total_ms = total_start.elapsed().as_millis() as u64;
            let response = RagResponse {
                answer: message,
                sources: Vec::new(),
                metrics,
                confidence: 0.0,
                guardrail_passed: false,
                verification: None,
                query_understanding: understanding,
                mode: self.mode,
                structured_output: None,
                structure: None,
            };
            self.log(&request, &response).await;
            return Ok(response);
        }

        // Step 3 (C1.Embedder + C6): adaptive retrieval.
        let engine = RetrievalEngine::new(self.embedder.clone(), self.store.clone());
        let options = RetrievalOptions::adaptive(
            understanding.query_type,
            request.total_cvs_in_session,
            request.k.unwrap_or(self.config.retrieval_k),
            request.threshold.unwrap_or(self.config.retrieval_score_threshold),
            request.cv_ids.clone(),
        );

        let embed_start = Instant::now();
        let query_embedding = match self
            .with_timeout("embed", self.config.timeouts.embed, engine.embed_query(&understanding.reformulated_prompt))
            .await
        {
            Ok(v) => v,
            Err(e) => return Ok(self.propagate_error_response(e, understanding)),
        };
        metrics.embed_ms = embed_start.elapsed().as_millis() as u64;

        let search_start = Instant::now();
        let results = match self
            .with_timeout("search", self.config.timeouts.search, engine.search(&query_embedding, &options))
            .await
        {
            Ok(r) => r,
            Err(e) => return Ok(self.propagate_error_response(e, understanding)),
        };
        metrics.search_ms = search_start.elapsed().as_millis() as u64;

        if results.is_empty() {
            metrics.total_ms = total_start.elapsed().as_millis() as u64;
            let response = RagResponse {
                answer: NO_RESULTS_MESSAGE.to_string(),
                sources: Vec::new(),
                metrics,
                confidence: 0.8,
                guardrail_passed: true,
                verification: None,
                query_understanding: understanding,
                mode: self.mode,
                structured_output: None,
                structure: None,
            };
            self.log(&request, &response).await;
            return Ok(response);
        }

        // Step 4 (C7): optional rerank, recovered pass-through on timeout/failure.
        let rerank_start = Instant::now();
        let results = match tokio::time::timeout(
            self.config.timeouts.rerank,
            self.reranker.rerank(&understanding.reformulated_prompt, results.clone()),
        )
        .await
        {
            Ok((reordered, _rerank_metrics)) => reordered,
            Err(_) => {
                warn!("rerank timed out, passing results through unchanged");
                results
            }
        };
        metrics.rerank_ms = rerank_start.elapsed().as_millis() as u64;

        // Step 5 (C8): generation.
        let generation_start = Instant::now();
        let generator = Generator::new(self.generation_llm.as_ref());
        let llm_response = match self
            .with_timeout(
                "generate",
                self.config.timeouts.generation,
                generator.generate(&understanding.reformulated_prompt, request.history, &results, &understanding.requirements),
            )
            .await
        {
            Ok(r) => r,
            Err(e) => return Ok(self.propagate_error_response(e, understanding)),
        };
        metrics.generation_ms = generation_start.elapsed().as_millis() as u64;

        let answer_text = if llm_response.text.trim().is_empty() {
            "Response could not be parsed.".to_string()
        } else {
            llm_response.text
        };

        // Step 6 (C9): verification, recovered (None) on timeout/failure.
        let verification_start = Instant::now();
        let verifier = Verifier::new(self.verification_llm.as_deref());
        let verification = match tokio::time::timeout(
            self.config.timeouts.verification,
            verifier.verify(&answer_text, &results),
        )
        .await
        {
            Ok(Ok(info)) => Some(info),
            Ok(Err(e)) => {
                warn!("verification failed, proceeding without it: {e}");
                None
            }
            Err(_) => {
                warn!("verification timed out, proceeding without it");
                None
            }
        };
        metrics.verification_ms = verification_start.elapsed().as_millis() as u64;

        let mut answer = answer_text;
        let confidence = match &verification {
            Some(info) => {
                if let Some(warning) = &info.warning {
                    answer.push_str("\n\n");
                    answer.push_str(warning);
                }
                info.combined_confidence
            }
            None => 0.5,
        };

        // Step 7 (C10/C11/C12): parse the LLM's free text and assemble the
        // structure the detected query type calls for. Best-effort: a
        // failure here never invalidates the markdown `answer` already
        // computed above, it only means `structured_output`/`structure`
        // stay `None` (spec §7 `OutputParsingWarning` is non-fatal).
        let structured_output = cv_output::OutputProcessor::process(&answer, &results);
        let candidates = candidates_from_results(&results);
        let scoring_profile = cv_output::scoring::default_profile();
        let structure_ctx = cv_output::StructureContext {
            candidates: &candidates,
            search_results: &results,
            requirements: &understanding.requirements,
            scoring_profile: &scoring_profile,
            verification: verification.as_ref(),
            structured_output: &structured_output,
            query: &understanding.reformulated_prompt,
        };
        let structure = cv_output::StructureRouter::route(understanding.query_type, &structure_ctx);
        let structure_json = serde_json::to_value(&structure).ok();

        metrics.total_ms = total_start.elapsed().as_millis() as u64;

        let response = RagResponse {
            answer,
            sources: results,
            metrics,
            confidence,
            guardrail_passed: true,
            verification,
            query_understanding: understanding,
            mode: self.mode,
            structured_output: Some(structured_output),
            structure: structure_json,
        };
        self.log(&request, &response).await;
        Ok(response)
    }

    async fn with_timeout<T, E: std::error::Error>(
        &self,
        stage: &str,
        duration: std::time::Duration,
        fut: impl std::future::Future<Output = std::result::Result<T, E>>,
    ) -> Result<T> {
        match tokio::time::timeout(duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CvError::ProviderFailed {
                stage: stage.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(CvError::ProviderTimeout {
                stage: stage.to_string(),
                elapsed_ms: duration.as_millis() as u64,
            }),
        }
    }

    /// embed/search/generate/understanding failures propagate as a failed
    /// response: `confidence = 0.0`, `guardrail_passed = true` (spec §5).
    fn propagate_error_response(&self, error: CvError, understanding: QueryUnderstanding) -> RagResponse {
        warn!("pipeline stage failed, propagating degraded response: {error}");
        RagResponse {
            answer: error.with_context(),
            sources: Vec::new(),
            metrics: StageMetrics::default(),
            confidence: 0.0,
            guardrail_passed: true,
            verification: None,
            query_understanding: understanding,
            mode: self.mode,
            structured_output: None,
            structure: None,
        }
    }

    async fn log(&self, request: &QueryRequest<'_>, response: &RagResponse) {
        let record = EvalLogRecord {
            ts: chrono::Utc::now(),
            query: request.question.to_string(),
            response_excerpt: EvalLogRecord::excerpt(&response.answer, EVAL_LOG_EXCERPT_CHARS),
            sources: response.sources.iter().map(|s| s.cv_id.clone()).collect(),
            metrics: response.metrics.clone(),
            hallucination_check: response.verification.clone(),
            guardrail_passed: response.guardrail_passed,
            session_id: request.session_id.clone(),
            mode: response.mode,
        };
        if let Err(e) = self.eval_log.append(&record).await {
            warn!("failed to append eval log record: {e}");
        }
    }
}

/// One [`CandidateContext`] per distinct `cv_id` in `results`, in
/// first-seen order. `EnrichedMetadata` is identical across every chunk of
/// a cv_id (spec invariant, §3.1), so the first hit's metadata stands in
/// for the whole candidate.
fn candidates_from_results(results: &[SearchResult]) -> Vec<CandidateContext> {
    let mut seen = std::collections::HashSet::new();
    results
        .iter()
        .filter(|r| seen.insert(r.cv_id.clone()))
        .map(|r| CandidateContext {
            cv_id: r.cv_id.clone(),
            candidate_name: candidate_name_from_filename(&r.filename),
            metadata: r.metadata.clone(),
        })
        .collect()
}

/// Best-effort display name from a CV's filename, for structures that need
/// a label but only have the retrieved chunk's filename to go on (the
/// parsed candidate name itself lives on `Cv`, not `SearchResult`).
/// Strips the extension and turns `_`/`-` into spaces.
fn candidate_name_from_filename(filename: &str) -> String {
    let stem = filename.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(filename);
    stem.replace(['_', '-'], " ").trim().to_string()
}

/// Convenience: collapse a `Session`'s stored CV ids/message history into
/// the fields `QueryRequest` needs, so callers don't have to destructure
/// a `Session` by hand at every call site.
impl<'a> QueryRequest<'a> {
    pub fn from_session(question: &'a str, session: &'a Session, k: Option<usize>, threshold: Option<f32>) -> Self {
        Self {
            question,
            session_id: Some(session.session_id.clone()),
            history: &session.messages,
            cv_ids: Some(session.cv_ids.clone()),
            total_cvs_in_session: session.cv_ids.len(),
            k,
            threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cv_models::{EmbeddingBatch, LlmResponse, ModelResult, VectorStoreStats};
    use cv_types::EnrichedMetadata;
    use std::sync::Mutex as StdMutex;

    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed_texts(&self, texts: &[String]) -> ModelResult<EmbeddingBatch> {
            Ok(EmbeddingBatch {
                embeddings: texts.iter().map(|_| vec![0.1_f32; 4]).collect(),
                tokens_used: 0,
                latency_ms: 0,
            })
        }
        fn dimensions(&self) -> u32 {
            4
        }
        fn model_name(&self) -> &str {
            "stub"
        }
    }

    struct StubStore {
        results: Vec<SearchResult>,
    }

    #[async_trait]
    impl VectorStore for StubStore {
        async fn add_documents(&self, _documents: Vec<EmbeddedChunk>) -> ModelResult<()> {
            Ok(())
        }
        async fn search(
            &self,
            _query_embedding: &[f32],
            _k: usize,
            _threshold: f32,
            _cv_ids: Option<&[String]>,
            _diversify_by_cv: bool,
        ) -> ModelResult<Vec<SearchResult>> {
            Ok(self.results.clone())
        }
        async fn get_stats(&self) -> ModelResult<VectorStoreStats> {
            Ok(VectorStoreStats::default())
        }
        async fn delete_by_cv_id(&self, _cv_id: &str) -> ModelResult<()> {
            Ok(())
        }
    }

    struct ScriptedLlm {
        reply: StdMutex<String>,
    }

    #[async_trait]
    impl Llm for ScriptedLlm {
        async fn generate(&self, _prompt: &str, _system_prompt: Option<&str>) -> ModelResult<LlmResponse> {
            Ok(LlmResponse {
                text: self.reply.lock().unwrap().clone(),
                prompt_tokens: 1,
                completion_tokens: 1,
                latency_ms: 1,
            })
        }
        fn model_id(&self) -> &str {
            "stub"
        }
    }

    fn sample_result(cv_id: &str) -> SearchResult {
        SearchResult {
            cv_id: cv_id.to_string(),
            chunk_id: format!("{cv_id}-chunk"),
            section_type: cv_types::SectionType::Experience,
            content: "Jane Doe has 5 years of Rust experience".to_string(),
            metadata: EnrichedMetadata::default(),
            similarity: 0.9,
            filename: "jane_doe.pdf".to_string(),
        }
    }

    fn understanding_reply(query_type: &str, is_cv_related: bool) -> String {
        format!(
            r#"{{"is_cv_related": {is_cv_related}, "query_type": "{query_type}", "understood": "q",
                "reformulated_prompt": "q", "requirements": []}}"#
        )
    }

    fn build_service(store_results: Vec<SearchResult>, understanding_reply: String, generation_reply: String) -> RagService {
        let dir = tempfile::tempdir().unwrap();
        RagServiceBuilder::new(RagConfig::default(), Mode::Local)
            .embedder(Arc::new(StubEmbedder))
            .store(Arc::new(StubStore { results: store_results }))
            .understanding_llm(Arc::new(ScriptedLlm { reply: StdMutex::new(understanding_reply) }))
            .generation_llm(Arc::new(ScriptedLlm { reply: StdMutex::new(generation_reply) }))
            .eval_log_path(dir.path().join("eval.jsonl").to_string_lossy().to_string())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn guardrail_rejects_non_cv_query_without_retrieval() {
        let service = build_service(
            vec![sample_result("cv_1")],
            understanding_reply("search", false),
            "unused".to_string(),
        );
        let response = service
            .query(QueryRequest {
                question: "tell me a joke",
                session_id: None,
                history: &[],
                cv_ids: None,
                total_cvs_in_session: 1,
                k: None,
                threshold: None,
            })
            .await
            .unwrap();
        assert!(!response.guardrail_passed);
        assert_eq!(response.confidence, 0.0);
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn no_retrieval_hits_returns_canned_message() {
        let service = build_service(vec![], understanding_reply("search", true), "unused".to_string());
        let response = service
            .query(QueryRequest {
                question: "who knows rust?",
                session_id: None,
                history: &[],
                cv_ids: None,
                total_cvs_in_session: 1,
                k: None,
                threshold: None,
            })
            .await
            .unwrap();
        assert!(response.guardrail_passed);
        assert!((response.confidence - 0.8).abs() < 1e-6);
        assert_eq!(response.answer, NO_RESULTS_MESSAGE);
    }

    #[tokio::test]
    async fn successful_query_returns_sources_and_confidence() {
        let service = build_service(
            vec![sample_result("cv_1")],
            understanding_reply("single_candidate", true),
            "Jane Doe has strong Rust experience.".to_string(),
        );
        let response = service
            .query(QueryRequest {
                question: "does jane know rust?",
                session_id: Some("s1".to_string()),
                history: &[],
                cv_ids: None,
                total_cvs_in_session: 1,
                k: None,
                threshold: None,
            })
            .await
            .unwrap();
        assert!(response.guardrail_passed);
        assert_eq!(response.sources.len(), 1);
        assert!(response.confidence > 0.0);
        let structured = response.structured_output.expect("structured output should be populated");
        assert!(!structured.direct_answer.is_empty());
        let structure = response.structure.expect("structure should be populated");
        assert_eq!(structure["structure_type"], "single_candidate");
    }

    #[tokio::test]
    async fn guardrail_rejection_leaves_structure_unset() {
        let service = build_service(
            vec![sample_result("cv_1")],
            understanding_reply("search", false),
            "unused".to_string(),
        );
        let response = service
            .query(QueryRequest {
                question: "tell me a joke",
                session_id: None,
                history: &[],
                cv_ids: None,
                total_cvs_in_session: 1,
                k: None,
                threshold: None,
            })
            .await
            .unwrap();
        assert!(response.structured_output.is_none());
        assert!(response.structure.is_none());
    }

    #[tokio::test]
    async fn empty_llm_text_falls_back_to_placeholder() {
        let service = build_service(
            vec![sample_result("cv_1")],
            understanding_reply("search", true),
            "".to_string(),
        );
        let response = service
            .query(QueryRequest {
                question: "who knows rust?",
                session_id: None,
                history: &[],
                cv_ids: None,
                total_cvs_in_session: 1,
                k: None,
                threshold: None,
            })
            .await
            .unwrap();
        assert!(response.answer.starts_with("Response could not be parsed."));
    }

    #[tokio::test]
    async fn index_documents_chunks_embeds_and_stores() {
        let service = build_service(vec![], understanding_reply("search", true), "unused".to_string());
        let count = service
            .index_documents(vec![DocumentInput {
                cv_id: "cv_1".to_string(),
                filename: "1_Jane_Doe_engineer.pdf".to_string(),
                raw_text: "Jane Doe\n\nExperience\nSenior engineer at Acme for 5 years.\n\nSkills\nRust, Python".to_string(),
            }])
            .await
            .unwrap();
        assert!(count > 0);
    }

    #[tokio::test]
    async fn index_documents_with_no_input_stores_nothing() {
        let service = build_service(vec![], understanding_reply("search", true), "unused".to_string());
        let count = service.index_documents(vec![]).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn mode_reports_the_mode_it_was_built_with() {
        let service = build_service(vec![], understanding_reply("search", true), "unused".to_string());
        assert_eq!(service.mode(), Mode::Local);
    }

    #[tokio::test]
    async fn store_stats_delegates_to_the_vector_store() {
        let service = build_service(vec![], understanding_reply("search", true), "unused".to_string());
        let stats = service.store_stats().await.unwrap();
        assert_eq!(stats, VectorStoreStats::default());
    }
}
