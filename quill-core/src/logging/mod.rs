//! Logging backend for the `log` facade
//!
//! The framework itself only calls `log::info!`, `log::debug!` and friends.
//! Applications that have no logger of their own can install this one once at
//! startup; it writes one formatted line per record to stdout or stderr.
//!
//! # Example
//!
//! ```rust,no_run
//! use quill_core::logging::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::development()).unwrap();
//! log::info!("Server starting on port {}", 8080);
//! ```

pub mod config;
pub mod formatter;

pub use config::{LogLevel, LogOutput, LoggingConfig};
pub use formatter::{LogEntry, LogFormat};

use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install the quill logger as the global `log` backend
///
/// Safe to call several times; only the first call has an effect. Fails when
/// another logger was already installed by someone else.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = install(config);
    });
    result
}

fn install(config: &LoggingConfig) -> anyhow::Result<()> {
    config.validate()?;
    log::set_boxed_logger(Box::new(QuillLogger::new(config.clone())))
        .map_err(|err| anyhow::anyhow!("Failed to install logger: {}", err))?;
    log::set_max_level(config.level.into());
    Ok(())
}

/// `log::Log` implementation writing formatted entries to a standard stream
pub struct QuillLogger {
    config: LoggingConfig,
}

impl QuillLogger {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Render a record the way this logger would write it
    pub fn render(&self, record: &log::Record) -> String {
        let entry = LogEntry::from_record(record, &self.config);
        self.config.format.format_entry(&entry)
    }
}

impl log::Log for QuillLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        LogLevel::from(metadata.level()) <= self.config.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.render(record);
        let _ = match self.config.output {
            LogOutput::Stdout => writeln!(std::io::stdout().lock(), "{}", line),
            LogOutput::Stderr => writeln!(std::io::stderr().lock(), "{}", line),
        };
    }

    fn flush(&self) {
        let _ = match self.config.output {
            LogOutput::Stdout => std::io::stdout().flush(),
            LogOutput::Stderr => std::io::stderr().flush(),
        };
    }
}
