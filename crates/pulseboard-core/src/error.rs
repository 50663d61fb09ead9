//! Error types for Pulseboard Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("Service error ({status_code}): {message}")]
    Service { status_code: u16, message: String },

    /// The response did not match the expected schema
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
