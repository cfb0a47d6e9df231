//! CLI-level configuration: where engine state lives on disk, layered on
//! top of [`cv_core::RagConfig`] (spec §6 env vars).

use std::path::{Path, PathBuf};

use cv_core::RagConfig;

/// Resolved CLI configuration: the engine's env-sourced [`RagConfig`] plus
/// the data directory this binary uses for the local vector store, eval
/// log and ephemeral session files. None of this is part of the engine
/// proper — it is the CLI driver's own on-disk bookkeeping.
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub rag: RagConfig,
}

impl CliConfig {
    pub fn load(data_dir_override: Option<&str>) -> anyhow::Result<Self> {
        let rag = RagConfig::from_env()?;
        let data_dir = resolve_data_dir(data_dir_override);
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir, rag })
    }

    pub fn vault_path(&self) -> PathBuf {
        self.data_dir.join("vault.db")
    }

    pub fn eval_log_path(&self) -> PathBuf {
        self.data_dir.join("eval_log.jsonl")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }
}

fn resolve_data_dir(data_dir_override: Option<&str>) -> PathBuf {
    if let Some(dir) = data_dir_override {
        return PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("CV_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join(".cv-rag")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_override_wins_over_env() {
        assert_eq!(resolve_data_dir(Some("/tmp/explicit")), PathBuf::from("/tmp/explicit"));
    }
}
