//! Error types for order book reconstruction.
//!
//! Replay itself is total; errors only come from ingesting collaborator data
//! (side tags, checkpoint strings, response bodies).

use thiserror::Error;

/// Result type alias for reconstruction operations.
pub type Result<T> = std::result::Result<T, ReconError>;

/// Main error type for reconstruction operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Side tag other than `bid` or `ask`
    #[error("Invalid side: {0:?} (expected \"bid\" or \"ask\")")]
    InvalidSide(String),

    /// Checkpoint price that is not a finite number
    #[error("Invalid price: {0:?}")]
    InvalidPrice(String),

    /// Checkpoint size that is not a finite number
    #[error("Invalid size: {0:?}")]
    InvalidSize(String),

    /// Tick-level data was not returned (typically a tier restriction)
    #[error("Tick data unavailable: {0}")]
    TickDataUnavailable(String),

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Generic(String),
}

impl ReconError {
    /// Create a generic error from any string-like type.
    pub fn generic(msg: impl Into<String>) -> Self {
        ReconError::Generic(msg.into())
    }
}

impl From<serde_json::Error> for ReconError {
    fn from(err: serde_json::Error) -> Self {
        ReconError::Json(err.to_string())
    }
}

impl From<String> for ReconError {
    fn from(err: String) -> Self {
        ReconError::Generic(err)
    }
}

impl From<&str> for ReconError {
    fn from(err: &str) -> Self {
        ReconError::Generic(err.to_string())
    }
}
