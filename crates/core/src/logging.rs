//! Logging setup built on the tracing ecosystem.
//!
//! # Environment Variables
//!
//! - `ASKDOCS_LOG`: Filter directive (like `RUST_LOG`), e.g., `askdocs_ui=debug`
//! - `ASKDOCS_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `ASKDOCS_LOG_DIR`: Directory for file logs (default `~/.askdocs/logs`)
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.file]
//! enabled = true
//! level = "debug"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use askdocs_core::logging::{self, LoggingConfig};
//!
//! let _guard = logging::init_logging(Some(LoggingConfig::default()))?;
//! # Ok::<(), askdocs_core::Error>(())
//! ```

use crate::Error;
use crate::config::LoggingSection;
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    /// All available log formats.
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    /// Parse a log format from a string.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    /// Get the string representation of this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// Where log events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// stderr, plus the log file when file logging is enabled
    #[default]
    Stderr,
    /// Only the log file; used while the terminal UI owns the screen
    FileOnly,
}

/// Resolved logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level for stderr output.
    pub level: String,
    /// Output format for stderr.
    pub format: LogFormat,
    /// Level for the rolling log file, when enabled.
    pub file_level: Option<String>,
    pub target: LogTarget,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::default(), file_level: None, target: LogTarget::Stderr }
    }
}

impl From<LoggingSection> for LoggingConfig {
    fn from(section: LoggingSection) -> Self {
        Self {
            level: section.level,
            format: LogFormat::parse_str(&section.format).unwrap_or_default(),
            file_level: if section.file.enabled { Some(section.file.level) } else { None },
            target: LogTarget::Stderr,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable file logging at the given level.
    pub fn with_file_logging(mut self, level: impl Into<String>) -> Self {
        self.file_level = Some(level.into());
        self
    }

    /// Route everything to the log file. File logging is enabled at the
    /// stderr level when it was off.
    pub fn file_only(mut self) -> Self {
        if self.file_level.is_none() {
            self.file_level = Some(self.level.clone());
        }
        self.target = LogTarget::FileOnly;
        self
    }

    /// Build an EnvFilter from this config and environment variables.
    fn build_env_filter(&self, fallback: &str) -> EnvFilter {
        let filter = env::var("ASKDOCS_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| fallback.to_string());

        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn"))
    }

    /// Detect if stderr is a TTY for pretty formatting.
    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Determine the appropriate format for stderr output.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("ASKDOCS_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if self.format != LogFormat::Pretty {
            return self.format;
        }

        if Self::is_tty() { LogFormat::Pretty } else { LogFormat::Compact }
    }

    /// Get the log directory path.
    pub fn log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("ASKDOCS_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".askdocs").join("logs"))
    }
}

/// Keeps the non-blocking file writer alive; drop it on shutdown to flush.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the global tracing subscriber.
///
/// Sets up an environment-based filter (`ASKDOCS_LOG` or `RUST_LOG`), a
/// formatted stderr layer unless the target is [`LogTarget::FileOnly`], and a
/// daily-rolling JSON file layer when file logging is enabled.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<LogGuard, Error> {
    let config = config.unwrap_or_default();
    let format = config.detect_format();

    let stderr_layer = match config.target {
        LogTarget::FileOnly => None,
        LogTarget::Stderr => {
            let layer = match format {
                LogFormat::Pretty => fmt::layer().pretty().with_writer(io::stderr).with_ansi(true).boxed(),
                LogFormat::Json => fmt::layer().json().with_writer(io::stderr).boxed(),
                LogFormat::Compact => fmt::layer().compact().with_writer(io::stderr).boxed(),
            };
            Some(layer.with_filter(config.build_env_filter(&config.level)))
        }
    };

    let mut guard = None;
    let file_layer = match &config.file_level {
        Some(level) => {
            let log_dir = LoggingConfig::log_dir()?;
            std::fs::create_dir_all(&log_dir)
                .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

            let file_appender = tracing_appender::rolling::daily(log_dir, "askdocs.log");
            let (non_blocking, worker) = tracing_appender::non_blocking(file_appender);
            guard = Some(worker);
            Some(
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_filter(config.build_env_filter(level)),
            )
        }
        None => None,
    };

    Registry::default()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {}", e)))?;

    Ok(LogGuard { _file: guard })
}

/// Shorten user text before it is written to logs.
pub fn preview(content: &str, max_chars: usize) -> String {
    let total = content.chars().count();
    if total <= max_chars {
        return content.to_string();
    }
    let mut truncated = content.chars().take(max_chars).collect::<String>();
    truncated.push_str(&format!("... ({} total chars)", total));
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileLoggingConfig;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!(LogFormat::parse_str("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse_str("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse_str("compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::parse_str("invalid"), None);
    }

    #[test]
    fn test_log_format_as_str() {
        for format in LogFormat::VALUES {
            assert_eq!(LogFormat::parse_str(format.as_str()), Some(*format));
        }
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file_level.is_none());
        assert_eq!(config.target, LogTarget::Stderr);
    }

    #[test]
    fn test_from_section() {
        let section = LoggingSection {
            level: "info".to_string(),
            format: "json".to_string(),
            file: FileLoggingConfig { enabled: true, level: "trace".to_string() },
        };
        let config = LoggingConfig::from(section);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let section = LoggingSection { format: "fancy".to_string(), ..LoggingSection::default() };
        assert_eq!(LoggingConfig::from(section).format, LogFormat::Pretty);
    }

    #[test]
    fn test_file_only_enables_file_logging() {
        let config = LoggingConfig::new().with_level("debug").file_only();
        assert_eq!(config.target, LogTarget::FileOnly);
        assert_eq!(config.file_level.as_deref(), Some("debug"));

        let config = LoggingConfig::new().with_file_logging("trace").file_only();
        assert_eq!(config.file_level.as_deref(), Some("trace"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        let long = "abcdefghijklmnopqrstuvwxyz";
        let shortened = preview(long, 10);
        assert!(shortened.starts_with("abcdefghij..."));
        assert!(shortened.contains("26 total chars"));
    }
}
