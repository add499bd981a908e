#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging setup for the bridge.
//!
//! Library crates only emit `tracing` events. Binaries call [`init`] once
//! with the `[logging]` section of the configuration to install a
//! subscriber. `RUST_LOG`, when set, overrides the configured level.

use std::fs::{File, OpenOptions};
use std::sync::Mutex;

use config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive
    #[error("Invalid log level '{level}': {reason}")]
    InvalidLevel {
        /// Directive as configured
        level: String,
        /// Parser message
        reason: String,
    },
    /// The log file could not be opened
    #[error("Failed to open log file: {0}")]
    File(#[from] std::io::Error),
    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Build the event filter for `config`, preferring `RUST_LOG` when present.
pub fn filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| LoggingError::InvalidLevel { level: config.level.clone(), reason: e.to_string() })
}

/// Install the global `tracing` subscriber described by `config`.
///
/// Events go to stderr, or are appended to `config.file` when set.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match &config.file {
        Some(path) => {
            let file = open_log_file(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

fn open_log_file(path: &std::path::Path) -> Result<File, LoggingError> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Emits a trace-level event tagged with `module`.
pub fn trace(module: &str, msg: &str) {
    tracing::trace!(module = module, "{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig { level: "bridge=loud".to_string(), file: None };
        match filter(&config) {
            Err(LoggingError::InvalidLevel { level, .. }) => assert_eq!(level, "bridge=loud"),
            other => panic!("Expected InvalidLevel, got {:?}", other.map(|f| f.to_string())),
        }
    }

    #[test]
    fn directive_levels_parse() {
        let config = LoggingConfig { level: "registry=debug,warn".to_string(), file: None };
        assert!(filter(&config).is_ok());
    }

    #[test]
    fn missing_log_directory_is_reported() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("missing").join("bridge.log");
        assert!(matches!(open_log_file(&path), Err(LoggingError::File(_))));
    }

    #[test]
    fn file_logging_installs_once() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let config = LoggingConfig { level: "info".to_string(), file: Some(dir.path().join("bridge.log")) };
        init(&config).expect("first init succeeds");
        assert!(matches!(init(&config), Err(LoggingError::AlreadyInitialized(_))));
        trace("logging", "still usable after a failed init");
    }
}
