use crate::ledger::pow::Difficulty;
use crate::utils::errors::LedgerError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_difficulty() -> u32 {
    4
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Sealing authority configuration (TOML).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorityConfig {
    /// leading zero hex digits required in every block hash
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    /// seal pending votes on this period; unset means on-demand only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal_interval_ms: Option<u64>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// chain export written on shutdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_path: Option<PathBuf>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            seal_interval_ms: None,
            log_filter: default_log_filter(),
            export_path: None,
        }
    }
}

impl AuthorityConfig {
    /// Load and validate a config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = Self::from_toml(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let cfg: AuthorityConfig = toml::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings that would exhaust CPU or spin the scheduler.
    pub fn validate(&self) -> std::result::Result<(), LedgerError> {
        self.difficulty()?;
        if self.seal_interval_ms == Some(0) {
            return Err(LedgerError::InvalidConfig("seal_interval_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn difficulty(&self) -> std::result::Result<Difficulty, LedgerError> {
        Difficulty::new(self.difficulty)
    }
}
