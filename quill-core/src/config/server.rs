//! Server configuration

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

use crate::http::{DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT};

/// Transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server listening port
    /// Env: QUILL_PORT
    /// Default: 8080
    pub port: u16,

    /// Server listening address
    /// Env: QUILL_HOST
    /// Default: "127.0.0.1"
    pub host: String,

    /// Maximum request body size in bytes
    /// Env: QUILL_MAX_BODY_SIZE
    /// Default: 10485760 (10MB)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, host: "127.0.0.1".to_string(), max_body_size: DEFAULT_MAX_BODY_SIZE }
    }
}

impl ServerConfig {
    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Self) {
        self.port = other.port;
        self.host = other.host;
        self.max_body_size = other.max_body_size;
    }

    pub fn apply_env_vars(&mut self) {
        if let Ok(port) = env::var("QUILL_PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }

        if let Ok(host) = env::var("QUILL_HOST") {
            self.host = host;
        }

        if let Ok(size) = env::var("QUILL_MAX_BODY_SIZE") {
            if let Ok(s) = size.parse() {
                self.max_body_size = s;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("Invalid port: port must be between 1 and 65535");
        }

        if self.host.is_empty() {
            bail!("Invalid host: host cannot be empty");
        }

        if self.max_body_size == 0 {
            bail!("Invalid max_body_size: must be greater than 0");
        }

        Ok(())
    }

    /// Listening address built from `host` and `port`
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = ServerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_zero_port_rejected() {
        let cfg = ServerConfig { port: 0, ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid port"));
    }

    #[test]
    fn test_zero_body_size_rejected() {
        let cfg = ServerConfig { max_body_size: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bad_host_in_socket_addr() {
        let cfg = ServerConfig { host: "not a host".to_string(), ..Default::default() };
        assert!(cfg.socket_addr().is_err());
    }

    #[test]
    #[serial]
    fn test_apply_env_vars() {
        std::env::set_var("QUILL_PORT", "9090");
        std::env::set_var("QUILL_HOST", "0.0.0.0");
        std::env::set_var("QUILL_MAX_BODY_SIZE", "not-a-number");
        let mut cfg = ServerConfig::default();
        cfg.apply_env_vars();
        std::env::remove_var("QUILL_PORT");
        std::env::remove_var("QUILL_HOST");
        std::env::remove_var("QUILL_MAX_BODY_SIZE");

        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }
}
