//! Eval Log (C15)
//!
//! Append-only per-query telemetry for offline evaluation (spec §6).
//! Writes one JSON object per line to a local file, synchronized with a
//! `tokio::sync::Mutex` so concurrent `query()` calls don't interleave
//! partial lines. Never read back at runtime — purely a write sink.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::instrument;

use cv_types::{Mode, StageMetrics, VerificationInfo};

use crate::error::Result;

/// One row of the eval log, matching the schema in spec §6:
/// `{ts, query, response_excerpt, sources[], metrics{}, hallucination_check{}, guardrail_passed, session_id, mode}`.
#[derive(Debug, Clone, Serialize)]
pub struct EvalLogRecord {
    pub ts: DateTime<Utc>,
    pub query: String,
    pub response_excerpt: String,
    pub sources: Vec<String>,
    pub metrics: StageMetrics,
    pub hallucination_check: Option<VerificationInfo>,
    pub guardrail_passed: bool,
    pub session_id: Option<String>,
    pub mode: Mode,
}

impl EvalLogRecord {
    /// Truncates `answer` to a fixed excerpt length; the full answer isn't
    /// replayed from the log (it's not read back at runtime, spec §6).
    pub fn excerpt(answer: &str, max_chars: usize) -> String {
        if answer.chars().count() <= max_chars {
            answer.to_string()
        } else {
            answer.chars().take(max_chars).collect::<String>() + "…"
        }
    }
}

/// Append-only eval log sink. In local mode this is a `.jsonl` file on
/// disk; cloud mode points the same shape at a managed store (spec §6) —
/// only the local file sink is implemented here, the trait boundary is
/// kept thin since no cloud eval-log client exists in this corpus.
pub struct EvalLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl EvalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self, record))]
    pub async fn append(&self, record: &EvalLogRecord) -> Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> EvalLogRecord {
        EvalLogRecord {
            ts: Utc::now(),
            query: "who knows rust?".to_string(),
            response_excerpt: "Jane Doe knows Rust.".to_string(),
            sources: vec!["cv_abc".to_string()],
            metrics: StageMetrics::default(),
            hallucination_check: None,
            guardrail_passed: true,
            session_id: Some("session_1".to_string()),
            mode: Mode::Local,
        }
    }

    #[test]
    fn excerpt_truncates_long_answers() {
        let long = "a".repeat(500);
        let excerpt = EvalLogRecord::excerpt(&long, 100);
        assert_eq!(excerpt.chars().count(), 101);
        assert!(excerpt.ends_with('…'));
    }

    #[test]
    fn excerpt_leaves_short_answers_untouched() {
        let short = "short answer";
        assert_eq!(EvalLogRecord::excerpt(short, 100), short);
    }

    #[tokio::test]
    async fn append_writes_one_json_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.jsonl");
        let log = EvalLog::new(&path);

        log.append(&sample_record()).await.unwrap();
        log.append(&sample_record()).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["query"], "who knows rust?");
        }
    }

    #[tokio::test]
    async fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.jsonl");
        let log = std::sync::Arc::new(EvalLog::new(&path));

        let mut handles = Vec::new();
        for i in 0..10 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                let mut record = sample_record();
                record.query = format!("query {i}");
                log.append(&record).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents.lines().count(), 10);
        for line in contents.lines() {
            assert!(serde_json::from_str::<serde_json::Value>(line).is_ok());
        }
    }
}
