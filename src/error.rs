//! Error types for restitch

use thiserror::Error;

/// Errors that can occur while driving or encoding a stream.
///
/// Data-shape problems (malformed chunks, unparseable tool arguments,
/// missing names) are never errors; they degrade to defaults and are
/// reported through [`FinalizeIssue`](crate::types::FinalizeIssue).
#[derive(Error, Debug)]
pub enum RestitchError {
    /// Upstream transport failure surfaced through the chunk stream
    #[error("Stream error: {0}")]
    Stream(String),

    /// JSON serialization failure while encoding wire output
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for restitch operations
pub type Result<T> = std::result::Result<T, RestitchError>;
