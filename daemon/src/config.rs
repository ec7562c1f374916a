//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use stakegov_types::GovernanceParams;
use stakegov_utils::LogFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Configuration for the stakegov daemon.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; every field
/// has a default, so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding the store dump.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Store dump file name, relative to `data_dir`.
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// JSON holdings file: `{ "asset": { "holder": units } }`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holdings_file: Option<PathBuf>,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Seconds between sweeps in `run` mode.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Whether sweeps also activate drafts whose window has started.
    #[serde(default)]
    pub auto_activate: bool,

    /// Governance core parameters.
    #[serde(default)]
    pub governance: GovernanceParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./stakegov_data")
}

fn default_state_file() -> String {
    "state.bin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    30
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Full path of the store dump.
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(&self.state_file)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            state_file: default_state_file(),
            holdings_file: None,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            sweep_interval_secs: default_sweep_interval_secs(),
            auto_activate: false,
            governance: GovernanceParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaemonConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = DaemonConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.sweep_interval_secs, 30);
        assert!(!config.auto_activate);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.governance.max_delegation_depth, 32);
        assert_eq!(config.state_path(), PathBuf::from("./stakegov_data/state.bin"));
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            sweep_interval_secs = 5
            auto_activate = true
            log_format = "json"

            [governance]
            max_delegation_depth = 8
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.sweep_interval_secs, 5);
        assert!(config.auto_activate);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.governance.max_delegation_depth, 8);
        assert_eq!(config.governance.adapter_max_attempts, 3); // default
    }

    #[test]
    fn file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stakegov.toml");
        std::fs::write(&path, "holdings_file = \"holdings.json\"\n").unwrap();
        let config = DaemonConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.holdings_file, Some(PathBuf::from("holdings.json")));
    }

    #[test]
    fn missing_file_returns_read_error() {
        let result = DaemonConfig::from_toml_file(Path::new("/nonexistent/stakegov.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
