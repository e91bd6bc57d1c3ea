//! Configuration for quill applications
//!
//! # Configuration Hierarchy
//!
//! Values are resolved in the following order (highest priority wins):
//!
//! 1. **Code** (builder calls on [`QuillConfig`] or the `App`)
//! 2. **Environment Variables** (`QUILL_*`)
//! 3. **Config File** (`quill.toml`)
//! 4. **Defaults**
//!
//! # Example
//!
//! ```no_run
//! use quill_core::config::QuillConfig;
//!
//! // Load with full supersedence
//! let config = QuillConfig::load()?;
//!
//! // Or load from a specific file
//! let config = QuillConfig::from_file("quill.toml")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;
pub mod server;

pub use app::{AppConfig, Environment};
pub use server::ServerConfig;

pub use crate::logging::LoggingConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE: &str = "quill.toml";

/// Complete quill configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
}

impl QuillConfig {
    /// Load `quill.toml` from the working directory, then environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error: defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file only
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.server.merge(other.server);
        self.app.merge(other.app);
        self.logging.merge(other.logging);
    }

    pub fn apply_env_vars(&mut self) {
        self.server.apply_env_vars();
        self.app.apply_env_vars();
        self.logging.apply_env_vars();
    }

    pub fn validate(&self) -> Result<()> {
        self.server.validate().context("Invalid [server] section")?;
        self.app.validate().context("Invalid [app] section")?;
        self.logging.validate().context("Invalid [logging] section")?;
        Ok(())
    }

    // Builder

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.server.host = host.to_string();
        self
    }

    pub fn with_env(mut self, env: Environment) -> Self {
        self.app.env = env;
        self
    }

    pub fn with_views(mut self, views: impl Into<std::path::PathBuf>) -> Self {
        self.app.views = views.into();
        self
    }

    pub fn with_sorted_routes(mut self, sort: bool) -> Self {
        self.app.sort_routes = sort;
        self
    }

    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.app.default_headers.insert(name.to_string(), value.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = QuillConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.app.env, Environment::Development);
        assert!(!config.app.sort_routes);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_from_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 3000\n\n[app]\nenv = \"production\"\nsort_routes = true\n\n[logging]\nlevel = \"warn\""
        )
        .unwrap();

        let config = QuillConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.app.env, Environment::Production);
        assert!(config.app.sort_routes);
        assert_eq!(config.app.view_engine, "html");
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    #[serial]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = QuillConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, QuillConfig::default());
    }

    #[test]
    fn test_bad_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        let err = QuillConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 3000").unwrap();

        std::env::set_var("QUILL_PORT", "4000");
        let config = QuillConfig::load_from(file.path());
        std::env::remove_var("QUILL_PORT");

        assert_eq!(config.unwrap().server.port, 4000);
    }

    #[test]
    fn test_builder() {
        let config = QuillConfig::default()
            .with_port(5000)
            .with_env(Environment::Production)
            .with_default_header("X-Powered-By", "quill");

        assert_eq!(config.server.port, 5000);
        assert!(!config.app.is_development());
        assert_eq!(config.app.default_headers.len(), 2);
    }
}
