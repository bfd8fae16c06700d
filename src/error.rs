//! Error handling for fetchkit

use thiserror::Error;

/// Main error type for fetchkit operations
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Lack of request url")]
    MissingUrl,

    #[error("Lack of request method")]
    MissingMethod,

    #[error("Unsupported request method: {0}")]
    InvalidMethod(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Failed to serialize request body: {0}")]
    Serialization(String),

    /// Errors from the underlying client, passed through untouched.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FetchError {
    /// Whether the request was rejected before anything hit the network.
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            FetchError::MissingUrl
                | FetchError::MissingMethod
                | FetchError::InvalidMethod(_)
                | FetchError::InvalidUrl(_)
                | FetchError::InvalidHeader(_)
        )
    }
}

/// Result type alias for fetchkit operations
pub type Result<T> = std::result::Result<T, FetchError>;
