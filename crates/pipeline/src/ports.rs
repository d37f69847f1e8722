//! Port traits implemented by infrastructure crates.
//!
//! The pipeline needs exactly two external collaborators: something that
//! fetches evidence and something that persists the final export. Transport
//! is the implementer's concern — the domain sees only these traits.
//!
//! Failures stay at the value level inside the pipeline: a [`FetchError`]
//! becomes an `{"error": …}` log record, an [`ExportError`] becomes the
//! ALLNIGHT step's failure record. Neither ever aborts a run.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::evidence::EvidenceItem;

/// Failure of an external evidence fetch.
///
/// `Display` and `Error` are implemented by hand because the `source` field
/// is an opaque identifier, not an underlying error cause.
#[derive(Debug)]
pub enum FetchError {
    /// The source could not be reached or answered with an error.
    Unavailable {
        /// Source identifier passed to `fetch`.
        source: String,
        /// Transport-level description.
        reason: String,
    },

    /// The source answered, but the body was not a valid evidence record.
    Malformed {
        /// Source identifier passed to `fetch`.
        source: String,
        /// Decode-level description.
        reason: String,
    },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { source, reason } => {
                write!(f, "evidence source '{source}' unavailable: {reason}")
            }
            Self::Malformed { source, reason } => {
                write!(
                    f,
                    "evidence source '{source}' returned a malformed record: {reason}"
                )
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Failure to persist the final export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export could not be written.
    #[error("export write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The export object could not be encoded.
    #[error("export encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------

/// An external evidence feed.
///
/// `source` is an opaque identifier (e.g. `"x_post"`); how it maps onto a
/// transport endpoint is the implementer's concern. Cancellation is not
/// supported — the pipeline awaits the fetch to completion.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    /// Fetches one evidence record from the named source.
    async fn fetch(&self, source: &str) -> Result<EvidenceItem, FetchError>;
}

/// Durable storage for the final state export.
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Persists one export object as a single JSON document.
    async fn persist(&self, export: &Value) -> Result<(), ExportError>;
}
