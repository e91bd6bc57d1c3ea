//! Logging configuration, usable both from code and as the `[logging]` section of `quill.toml`

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use super::LogFormat;

/// Log levels in order of severity (compatible with the `log` crate)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug => LogLevel::Debug,
            log::Level::Trace => LogLevel::Trace,
        }
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => bail!("Unknown log level: {}", other),
        }
    }
}

/// Which standard stream receives log lines
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    Stderr,
}

/// Logger settings
///
/// # Example
///
/// ```rust
/// use quill_core::logging::{LogLevel, LoggingConfig};
///
/// let config = LoggingConfig::production().with_context_field("service", "blog");
/// assert_eq!(config.level, LogLevel::Info);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level to capture
    /// Env: QUILL_LOG_LEVEL
    pub level: LogLevel,
    /// Env: QUILL_LOG_FORMAT (human, json, logfmt)
    pub format: LogFormat,
    pub output: LogOutput,
    /// Fields added to every entry
    pub context_fields: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Human,
            output: LogOutput::Stdout,
            context_fields: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Info level, JSON lines on stdout
    pub fn production() -> Self {
        Self { level: LogLevel::Info, format: LogFormat::Json, ..Self::default() }
    }

    /// Debug level, human-readable lines on stdout
    pub fn development() -> Self {
        Self { level: LogLevel::Debug, format: LogFormat::Human, ..Self::default() }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_stderr(mut self) -> Self {
        self.output = LogOutput::Stderr;
        self
    }

    /// Add a field that appears in every log entry
    pub fn with_context_field(mut self, key: &str, value: &str) -> Self {
        self.context_fields.insert(key.to_string(), value.to_string());
        self
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        *self = other;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(level) = env::var("QUILL_LOG_LEVEL") {
            match level.parse() {
                Ok(level) => self.level = level,
                Err(err) => log::warn!("Ignoring QUILL_LOG_LEVEL: {}", err),
            }
        }

        if let Ok(format) = env::var("QUILL_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(err) => log::warn!("Ignoring QUILL_LOG_FORMAT: {}", err),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.context_fields.keys().any(|key| key.is_empty()) {
            bail!("Invalid logging context field: key cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_production_config() {
        let config = LoggingConfig::production();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_development_config() {
        let config = LoggingConfig::development();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LoggingConfig::production()
            .with_context_field("service", "test")
            .with_level(LogLevel::Debug)
            .with_stderr();

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.output, LogOutput::Stderr);
        assert_eq!(config.context_fields.get("service").map(String::as_str), Some("test"));
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_toml_section() {
        let config: LoggingConfig = toml::from_str("level = \"trace\"\nformat = \"logfmt\"").unwrap();
        assert_eq!(config.level, LogLevel::Trace);
        assert_eq!(config.format, LogFormat::Logfmt);
        assert_eq!(config.output, LogOutput::Stdout);
    }

    #[test]
    #[serial]
    fn test_apply_env_vars() {
        std::env::set_var("QUILL_LOG_LEVEL", "error");
        std::env::set_var("QUILL_LOG_FORMAT", "json");
        let mut config = LoggingConfig::default();
        config.apply_env_vars();
        std::env::remove_var("QUILL_LOG_LEVEL");
        std::env::remove_var("QUILL_LOG_FORMAT");

        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.format, LogFormat::Json);
    }
}
