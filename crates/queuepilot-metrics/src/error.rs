//! Error types for metrics retrieval and ingest.

use thiserror::Error;

/// Result type alias for ingest operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur retrieving or ingesting metric series.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The namespace did not contain exactly one environment, service, and
    /// instance segment.
    #[error("unparsable metric namespace: {0}")]
    UnparsableNamespace(String),

    #[error("metrics source error: {0}")]
    Source(String),

    #[error("failed to decode render response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}
