use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Error types for the extraction engine.
///
/// Candidate rejection is deliberately absent here: a pattern failing
/// validation is a silent per-candidate drop recorded in the trace, not an
/// error. A page response lacking expected fields is also not an error; it
/// counts as zero comments and pagination continues.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The comment source returned a non-success status. Fatal for the
    /// whole run; no partial result, no retry.
    #[error("comment source request failed with status {status}: {message}")]
    Source { status: u16, message: String },

    #[error("not a recognizable video URL or id: {0}")]
    InvalidVideoUrl(String),

    #[error("extraction cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
