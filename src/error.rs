//! Error types for the logging core.
//!
//! Only construction can fail the process: configuration and sink setup errors
//! are returned to the caller. Everything that happens in the background
//! (compression, retention cleanup) is logged and swallowed.

use std::io;
use std::path::PathBuf;

use crate::config::validation::ValidationError;

/// Result type for sink operations.
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The configuration file is not valid TOML for the schema.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// One or more semantic checks failed.
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised by the daily rotating file sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The log directory could not be created.
    #[error("Failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// Directory that failed to be created.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// A log file could not be opened.
    #[error("Failed to open log file {path}: {source}")]
    Open {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// Write, flush or directory listing failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The sink has been closed and no file handle is open.
    #[error("log file is closed")]
    Closed,
}

impl From<SinkError> for io::Error {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Io(e) => e,
            SinkError::Closed => io::Error::new(io::ErrorKind::BrokenPipe, err),
            other => io::Error::other(other),
        }
    }
}

/// Errors surfaced by the logger manager.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Invalid configuration.
    #[error("invalid logging configuration: {0}")]
    Config(#[from] ConfigError),

    /// The file sink failed.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The health probe could not write to the output.
    #[error("log output is not writable: {0}")]
    HealthCheck(#[source] io::Error),

    /// A global `tracing` subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}
