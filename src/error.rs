//! vidthumb error types

/// Error code reported to hosts for every failed request.
pub const ERROR_CODE: &str = "CreateThumbnail_ERROR";

/// vidthumb error types
///
/// Payloads are plain strings so a single failure can be cloned out to every
/// caller that was waiting on the same in-flight extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThumbnailError {
    // Filesystem errors
    #[error("storage error: {0}")]
    Storage(String),

    // Media errors
    #[error("decode error: {0}")]
    Decode(String),

    #[error("unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("encode error: {0}")]
    Encode(String),

    // Request errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Background worker stopped or a blocking task panicked.
    #[error("worker error: {0}")]
    Worker(String),
}

impl ThumbnailError {
    /// Error code surfaced to the host runtime.
    ///
    /// Every failure is reported under the same code; the display string
    /// carries the underlying description.
    pub fn code(&self) -> &'static str {
        ERROR_CODE
    }

    /// Whether this error came from reading or decoding media.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<std::io::Error> for ThumbnailError {
    fn from(err: std::io::Error) -> Self {
        ThumbnailError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ThumbnailError {
    fn from(err: serde_json::Error) -> Self {
        ThumbnailError::InvalidInput(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ThumbnailError {
    fn from(err: tokio::task::JoinError) -> Self {
        ThumbnailError::Worker(format!("blocking task failed: {err}"))
    }
}

/// Result type alias for vidthumb operations
pub type Result<T> = std::result::Result<T, ThumbnailError>;
