//! Ares Travel error types

use serde::Serialize;
use thiserror::Error;

/// Ares Travel error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response provider failure (network, status, malformed payload)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider call exceeded its deadline
    #[error("Provider timed out after {0}ms")]
    Timeout(u64),

    /// Booking/data file error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Rejected request payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for Ares Travel operations
pub type Result<T> = std::result::Result<T, Error>;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code("BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code("INTERNAL_ERROR", message)
    }

    fn with_code(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

impl From<&Error> for ApiError {
    fn from(err: &Error) -> Self {
        match err {
            Error::Validation(msg) => ApiError::bad_request(msg.clone()),
            other => ApiError::internal(other.to_string()),
        }
    }
}
