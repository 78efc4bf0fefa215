//! Runtime configuration for memory tree sessions.
//!
//! # Responsibility
//! - Deserialize user configuration from JSON with defaults for every field.
//! - Reject values that would make sessions or caches misbehave.
//!
//! # Invariants
//! - A missing config file yields `MemtreeConfig::default()`.
//! - `validate()` is applied to every loaded config.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

const DEFAULT_INDENT_STEP: u16 = 16;
const DEFAULT_SUGGESTION_TTL_SECS: u64 = 60;

/// Errors from config loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file exists but cannot be read.
    Io(std::io::Error),
    /// Config text is not valid JSON for this shape.
    Parse(serde_json::Error),
    /// Field value is out of range.
    Invalid { field: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid { field, message } => write!(f, "invalid config `{field}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Memory tree session and process settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemtreeConfig {
    /// Indentation per depth level of a visible row.
    pub indent_step: u16,
    /// Whether a fresh session starts with the root row expanded.
    pub expand_root_on_open: bool,
    /// Freshness window for secret/variable key suggestions.
    pub suggestion_ttl_secs: u64,
    /// Log level passed to `logging::init_logging`.
    pub log_level: String,
}

impl Default for MemtreeConfig {
    fn default() -> Self {
        Self {
            indent_step: DEFAULT_INDENT_STEP,
            expand_root_on_open: true,
            suggestion_ttl_secs: DEFAULT_SUGGESTION_TTL_SECS,
            log_level: crate::logging::default_log_level().to_string(),
        }
    }
}

impl MemtreeConfig {
    /// Parses and validates config from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads config from `path`; defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indent_step == 0 {
            return Err(ConfigError::Invalid {
                field: "indent_step",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.suggestion_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "suggestion_ttl_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if let Err(message) = crate::logging::normalize_level(&self.log_level) {
            return Err(ConfigError::Invalid {
                field: "log_level",
                message,
            });
        }
        Ok(())
    }

    pub fn suggestion_ttl(&self) -> Duration {
        Duration::from_secs(self.suggestion_ttl_secs)
    }
}
