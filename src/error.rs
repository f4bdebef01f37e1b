//! Domain-specific error types for packreview

use thiserror::Error;

/// Main error type for the packaging-review pipeline
#[derive(Error, Debug)]
pub enum PackReviewError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Chat provider error: {message}")]
    Llm { message: String },

    #[error("Extraction error: {message}")]
    Extraction { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Packet error: {message}")]
    Packet { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<serde_json::Error> for PackReviewError {
    fn from(err: serde_json::Error) -> Self {
        PackReviewError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for PackReviewError {
    fn from(err: std::io::Error) -> Self {
        PackReviewError::Io {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for PackReviewError {
    fn from(err: reqwest::Error) -> Self {
        PackReviewError::Llm {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

/// Result type alias for packreview operations
pub type Result<T> = std::result::Result<T, PackReviewError>;
