//! Error types for gf-finder

use thiserror::Error;

/// Main error type for gf-finder operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected locally, before any network call
    #[error("{0}")]
    Validation(String),

    /// The location capability denied or failed
    #[error("{0}")]
    LocationUnavailable(String),

    /// City name could not be resolved to a coordinate
    #[error("{0}")]
    Resolution(String),

    /// Place search failed (network, non-success status, malformed payload)
    #[error("{0}")]
    Fetch(String),

    /// The operation was superseded; never shown to the user
    #[error("operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for the internal cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias for gf-finder operations
pub type Result<T> = std::result::Result<T, Error>;
