//! Error types for unlock-bench
//!
//! Two layers of errors live here:
//! - [`Error`] covers run-level failures (configuration, input files, report output).
//! - [`FetchError`] covers per-task faults. These never escape the fetch worker; they are
//!   folded into an [`AttemptRecord`](crate::types::AttemptRecord) with a short note and
//!   the full detail goes to the diagnostic log.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for unlock-bench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unlock-bench
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "ladder")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Delimited input or report error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Network error (building the HTTP client, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A target list could not be interpreted
    #[error("invalid input {path}: {message}")]
    InvalidInput {
        /// The offending input file
        path: PathBuf,
        /// What was wrong with it
        message: String,
    },

    /// A configured dataset file does not exist
    #[error("dataset not found: {0}")]
    DatasetNotFound(PathBuf),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// A fault that ended a single fetch attempt before a usable response was classified.
///
/// `Display` carries the full detail for the diagnostic log; [`FetchError::kind`] is the
/// short, stable name that ends up in the report.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the transport timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection to the provider (or its proxy) could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request failed for another transport or protocol reason
    #[error("request failed: {0}")]
    Request(String),

    /// The response started but its body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The response body could not be persisted as an artifact
    #[error("failed to write artifact {path}: {source}")]
    Artifact {
        /// Where the artifact was being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The worker task itself panicked
    #[error("fetch task panicked: {0}")]
    Panicked(String),
}

impl FetchError {
    /// Classify a reqwest error into a fault kind
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let detail = error_chain(&err);
        if err.is_timeout() {
            FetchError::Timeout(detail)
        } else if err.is_connect() {
            FetchError::Connect(detail)
        } else if err.is_body() || err.is_decode() {
            FetchError::Body(detail)
        } else {
            FetchError::Request(detail)
        }
    }

    /// Stable, machine-friendly name of the fault kind
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "TimeoutError",
            FetchError::Connect(_) => "ConnectError",
            FetchError::Request(_) => "RequestError",
            FetchError::Body(_) => "ReadError",
            FetchError::Artifact { .. } => "IoError",
            FetchError::Panicked(_) => "Panic",
        }
    }

    /// Short note recorded in the report for this fault
    pub fn note(&self) -> String {
        format!("exception: {}", self.kind())
    }
}

/// Flatten an error and its sources into one line.
///
/// reqwest hides the interesting part (proxy refused, DNS failure) in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
