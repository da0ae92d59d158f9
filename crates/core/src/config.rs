use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// API root, e.g. `http://localhost:8000/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connect timeout; conversation calls themselves are never timed out
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), connect_timeout_secs: default_connect_timeout_secs() }
    }
}

impl BackendConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Conversation view tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Distance from the bottom (in viewport units) still treated as "at bottom"
    #[serde(default = "default_scroll_tolerance")]
    pub scroll_tolerance: u32,

    /// Minimum spacing between scroll-state evaluations
    #[serde(default = "default_measure_interval_ms")]
    pub measure_interval_ms: u64,

    /// Maximum characters in a citation label
    #[serde(default = "default_label_max_chars")]
    pub label_max_chars: usize,

    /// Maximum characters of a snippet shown in the sources list
    #[serde(default = "default_snippet_max_chars")]
    pub snippet_max_chars: usize,
}

fn default_scroll_tolerance() -> u32 {
    1
}

fn default_measure_interval_ms() -> u64 {
    50
}

fn default_label_max_chars() -> usize {
    60
}

fn default_snippet_max_chars() -> usize {
    140
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            scroll_tolerance: default_scroll_tolerance(),
            measure_interval_ms: default_measure_interval_ms(),
            label_max_chars: default_label_max_chars(),
            snippet_max_chars: default_snippet_max_chars(),
        }
    }
}

impl ChatConfig {
    pub fn measure_interval(&self) -> Duration {
        Duration::from_millis(self.measure_interval_ms)
    }
}

/// File logging section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_file_level")]
    pub level: String,
}

fn default_file_level() -> String {
    "debug".to_string()
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: default_file_level() }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,

    /// `pretty`, `json` or `compact`
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default)]
    pub file: FileLoggingConfig,
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: default_level(), format: default_format(), file: FileLoggingConfig::default() }
    }
}

/// Root configuration structure for askdocs.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub logging: LoggingSection,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)
            .map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "config not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Replace the backend root, validating it like a file-provided value
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self> {
        self.backend.base_url = base_url.into();
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        use crate::Error;

        let url = self.backend.base_url.trim();
        if url.is_empty() {
            return Err(Error::Config(ConfigError::InvalidBaseUrl("empty".to_string()).to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(ConfigError::InvalidBaseUrl(url.to_string()).to_string()));
        }
        if self.chat.measure_interval_ms == 0 {
            return Err(Error::Config(
                ConfigError::OutOfRange("chat.measure_interval_ms must be positive".to_string()).to_string(),
            ));
        }
        if self.chat.label_max_chars < 8 {
            return Err(Error::Config(
                ConfigError::OutOfRange("chat.label_max_chars must be at least 8".to_string()).to_string(),
            ));
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# AskDocs configuration
# Copy this file to askdocs.toml and adjust as needed

[backend]
# API root of the AskDocs backend
base_url = "http://localhost:8000/api"
# Connect timeout in seconds (answers themselves are never timed out)
connect_timeout_secs = 10

[chat]
# Rows from the bottom that still count as "at bottom"
scroll_tolerance = 1
# Scroll state is re-evaluated at most once per interval
measure_interval_ms = 50
# Citation labels longer than this are shortened
label_max_chars = 60
snippet_max_chars = 140

[logging]
level = "warn"
# pretty, json or compact
format = "pretty"

[logging.file]
enabled = false
level = "debug"
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Base URL missing or not http(s)
    #[error("invalid backend base_url: {0}")]
    InvalidBaseUrl(String),

    /// Numeric setting outside its valid range
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}
