// src/error.rs
//! Error taxonomy.
//!
//! - [`AdapterFailure`]: one source adapter could not produce data for one
//!   category. Never escapes the orchestrator; it becomes a fallback decision.
//! - [`NormalizeError`]: one raw record was rejected. Logged and skipped.
//! - [`ExportError`]: the final CSV could not be written. The only fatal error.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why an adapter gave up. Drives the retry/advance decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Transport, TLS, timeout, 5xx. Worth a bounded retry.
    Network,
    /// Credential missing or refused by the service.
    Authentication,
    /// The source answered but had nothing for this window.
    NoData,
    /// Response or page did not match any known shape/layout.
    ParseMismatch,
    /// The adapter cannot run in this environment (e.g. no browser binary).
    Unavailable,
}

impl FailureReason {
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureReason::Network)
    }

    pub fn tag(self) -> &'static str {
        match self {
            FailureReason::Network => "network",
            FailureReason::Authentication => "authentication",
            FailureReason::NoData => "no-data",
            FailureReason::ParseMismatch => "parse-mismatch",
            FailureReason::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("[{reason}] {message}")]
pub struct AdapterFailure {
    pub reason: FailureReason,
    pub message: String,
}

impl AdapterFailure {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self { reason, message: message.into() }
    }
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureReason::Network, message)
    }
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(FailureReason::Authentication, message)
    }
    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(FailureReason::NoData, message)
    }
    pub fn parse_mismatch(message: impl Into<String>) -> Self {
        Self::new(FailureReason::ParseMismatch, message)
    }
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(FailureReason::Unavailable, message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unparseable {field} `{value}`")]
    BadDate { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("path exists but is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io { path: path.into(), source }
    }
}

/// The frontends' tokio runtime could not be built.
#[derive(Debug, Error)]
#[error("cannot start async runtime: {0}")]
pub struct RuntimeError(#[from] std::io::Error);
