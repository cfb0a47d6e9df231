//! Runtime configuration (spec §6)
//!
//! `RagConfig` fields map 1:1 to the spec's env vars. Loaded with
//! `dotenvy` (a `.env` file, if present, is merged into the process
//! environment before reading); defaults-plus-override, but env-first
//! rather than file-first.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CvError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultMode {
    Local,
    Cloud,
}

/// Per-stage timeouts (spec §5): 60s understanding/rerank/verify, 120s
/// generation, 30s embed/search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub understanding: Duration,
    pub embed: Duration,
    pub search: Duration,
    pub rerank: Duration,
    pub generation: Duration,
    pub verification: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            understanding: Duration::from_secs(60),
            embed: Duration::from_secs(30),
            search: Duration::from_secs(30),
            rerank: Duration::from_secs(60),
            generation: Duration::from_secs(120),
            verification: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub default_mode: DefaultMode,

    pub openrouter_api_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_service_key: Option<String>,

    pub retrieval_k: usize,
    pub retrieval_score_threshold: f32,

    pub understanding_model: String,
    pub rerank_model: String,
    pub generation_model: String,
    pub verification_model: String,

    #[serde(skip, default)]
    pub timeouts: TimeoutConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            default_mode: DefaultMode::Local,
            openrouter_api_key: None,
            supabase_url: None,
            supabase_service_key: None,
            retrieval_k: 8,
            retrieval_score_threshold: 0.25,
            understanding_model: "local-classifier".to_string(),
            rerank_model: "local-reranker".to_string(),
            generation_model: "local-generator".to_string(),
            verification_model: "local-verifier".to_string(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl RagConfig {
    /// Loads a `.env` file (if present, silently ignored otherwise) and
    /// reads every field from the process environment, falling back to
    /// the spec defaults.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(mode) = env::var("DEFAULT_MODE") {
            config.default_mode = match mode.to_lowercase().as_str() {
                "cloud" => DefaultMode::Cloud,
                "local" => DefaultMode::Local,
                other => {
                    return Err(CvError::Config(format!(
                        "DEFAULT_MODE must be 'local' or 'cloud', got '{other}'"
                    )))
                }
            };
        }

        config.openrouter_api_key = env::var("OPENROUTER_API_KEY").ok();
        config.supabase_url = env::var("SUPABASE_URL").ok();
        config.supabase_service_key = env::var("SUPABASE_SERVICE_KEY").ok();

        if let Ok(k) = env::var("RETRIEVAL_K") {
            config.retrieval_k = k
                .parse()
                .map_err(|_| CvError::Config(format!("RETRIEVAL_K must be a positive integer, got '{k}'")))?;
        }
        if let Ok(t) = env::var("RETRIEVAL_SCORE_THRESHOLD") {
            config.retrieval_score_threshold = t
                .parse()
                .map_err(|_| CvError::Config(format!("RETRIEVAL_SCORE_THRESHOLD must be a float, got '{t}'")))?;
        }

        if let Ok(m) = env::var("UNDERSTANDING_MODEL") {
            config.understanding_model = m;
        }
        if let Ok(m) = env::var("RERANK_MODEL") {
            config.rerank_model = m;
        }
        if let Ok(m) = env::var("GENERATION_MODEL") {
            config.generation_model = m;
        }
        if let Ok(m) = env::var("VERIFICATION_MODEL") {
            config.verification_model = m;
        }

        if config.default_mode == DefaultMode::Cloud
            && (config.openrouter_api_key.is_none() || config.supabase_url.is_none() || config.supabase_service_key.is_none())
        {
            return Err(CvError::Config(
                "cloud mode requires OPENROUTER_API_KEY, SUPABASE_URL and SUPABASE_SERVICE_KEY".to_string(),
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = RagConfig::default();
        assert_eq!(config.retrieval_k, 8);
        assert!((config.retrieval_score_threshold - 0.25).abs() < 1e-6);
        assert_eq!(config.default_mode, DefaultMode::Local);
    }
}
