//! Application configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Deployment environment; controls whether error detail reaches clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => bail!("Unknown environment: {}", other),
        }
    }
}

/// Application-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Env: QUILL_ENV
    /// Default: development
    pub env: Environment,

    /// Headers copied onto every response before routing
    pub default_headers: BTreeMap<String, String>,

    /// Template directory
    /// Env: QUILL_VIEWS
    /// Default: "views"
    pub views: PathBuf,

    /// Extension assumed for template names that carry none
    /// Default: "html"
    pub view_engine: String,

    /// Sort every route bucket by descending priority when the app starts serving
    /// Default: false (registration order)
    pub sort_routes: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut default_headers = BTreeMap::new();
        default_headers.insert("Content-Type".to_string(), "text/html; charset=utf-8".to_string());

        Self {
            env: Environment::Development,
            default_headers,
            views: PathBuf::from("views"),
            view_engine: "html".to_string(),
            sort_routes: false,
        }
    }
}

impl AppConfig {
    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.env = other.env;
        self.default_headers = other.default_headers;
        self.views = other.views;
        self.view_engine = other.view_engine;
        self.sort_routes = other.sort_routes;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(value) = env::var("QUILL_ENV") {
            match value.parse() {
                Ok(env) => self.env = env,
                Err(err) => log::warn!("Ignoring QUILL_ENV: {}", err),
            }
        }

        if let Ok(views) = env::var("QUILL_VIEWS") {
            self.views = PathBuf::from(views);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.view_engine.is_empty() || self.view_engine.starts_with('.') {
            bail!("Invalid view_engine: expected an extension such as \"html\"");
        }

        for (name, value) in &self.default_headers {
            if name.is_empty() || name.contains(|c: char| c == ':' || c.is_whitespace()) {
                bail!("Invalid default header name: {:?}", name);
            }
            if value.contains(['\r', '\n']) {
                bail!("Invalid value for default header {}", name);
            }
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert!(cfg.is_development());
        assert_eq!(cfg.view_engine, "html");
        assert_eq!(
            cfg.default_headers.get("Content-Type").map(String::as_str),
            Some("text/html; charset=utf-8")
        );
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_header_injection_rejected() {
        let mut cfg = AppConfig::default();
        cfg.default_headers.insert("X-Test".to_string(), "a\r\nb".to_string());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    #[serial]
    fn test_apply_env_vars() {
        std::env::set_var("QUILL_ENV", "production");
        std::env::set_var("QUILL_VIEWS", "templates");
        let mut cfg = AppConfig::default();
        cfg.apply_env_vars();
        std::env::remove_var("QUILL_ENV");
        std::env::remove_var("QUILL_VIEWS");

        assert_eq!(cfg.env, Environment::Production);
        assert_eq!(cfg.views, PathBuf::from("templates"));
    }
}
