//! Core configuration.
//!
//! # Responsibility
//! - Describe database, logging and search settings in one serde document.
//! - Provide defaults so an empty document is a valid configuration.
//!
//! # Invariants
//! - Missing keys fall back to defaults; unknown keys are rejected.

use crate::logging::default_log_level;
use crate::search::ExecutionControl;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_MAX_LIMIT: u32 = 100;
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite file; `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Requests asking for more rows are clamped to this value.
    pub max_limit: u32,
    /// Per-search deadline; `None` disables it.
    pub timeout_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_limit: DEFAULT_MAX_LIMIT,
            timeout_ms: Some(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl SearchConfig {
    pub fn apply_limit(&self, requested: u32) -> u32 {
        requested.min(self.max_limit)
    }

    pub fn execution_control(&self) -> ExecutionControl {
        ExecutionControl {
            cancel: None,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, SearchConfig};
    use std::time::Duration;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.search.max_limit, 100);
        assert_eq!(
            config.search.execution_control().timeout,
            Some(Duration::from_millis(5_000))
        );
    }

    #[test]
    fn partial_document_overrides_only_given_keys() {
        let config = CoreConfig::from_json_str(
            r#"{ "db_path": "/tmp/places.db", "search": { "max_limit": 25, "timeout_ms": null } }"#,
        )
        .unwrap();
        assert_eq!(config.search.max_limit, 25);
        assert!(config.search.execution_control().timeout.is_none());
        assert_eq!(config.logging, Default::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CoreConfig::from_json_str(r#"{ "serch": {} }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn apply_limit_clamps_to_max() {
        let config = SearchConfig {
            max_limit: 10,
            timeout_ms: None,
        };
        assert_eq!(config.apply_limit(50), 10);
        assert_eq!(config.apply_limit(3), 3);
    }
}
