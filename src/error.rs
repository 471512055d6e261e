//! Error types for casepoll.
//!
//! Only [`PollError`] ever reaches the caller of a run. Transport and
//! extraction errors are absorbed by the case poller and turned into
//! lookup records.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors: bad invocation parameters, configuration, exports.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("Invalid identifier range: {0}")]
    InvalidRange(String),
    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Failure of a single request to the status endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Rate limited (HTTP {0})")]
    RateLimited(u16),
}

/// The response document did not have the expected structure.
///
/// `document` holds the text of the page's error region, or the whole page
/// text when there is none, so the classifier can look for known markers.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("Status container not found")]
    MissingContainer { document: String },
    #[error("Status heading not found")]
    MissingHeading { document: String },
}

impl ExtractionError {
    pub fn document(&self) -> &str {
        match self {
            ExtractionError::MissingContainer { document }
            | ExtractionError::MissingHeading { document } => document,
        }
    }
}
