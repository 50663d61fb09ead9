//! Pulseboard Egress Connectors
//!
//! This crate provides clients for the two services Pulseboard consumes:
//! - Identity service (login, registration, profile)
//! - Analytics service (summary, per-type and date-range aggregates)

pub mod analytics;
pub mod client;
pub mod identity;

pub use analytics::{AnalyticsClient, AnalyticsConfig};
pub use client::HttpClientConfig;
pub use identity::{AuthClient, AuthError, IdentityConfig, RegisterRequest};

use thiserror::Error;

/// Failure talking to an upstream service
#[derive(Debug, Error)]
pub enum EgressError {
    /// Transport failure: the request never produced a response
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Service error ({status_code}): {message}")]
    ServiceError { status_code: u16, message: String },

    /// The body did not match the expected schema
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, EgressError>;

impl From<EgressError> for pulseboard_core::Error {
    fn from(err: EgressError) -> Self {
        match err {
            EgressError::HttpError(e) => pulseboard_core::Error::Network(e.to_string()),
            EgressError::ServiceError {
                status_code,
                message,
            } => pulseboard_core::Error::Service {
                status_code,
                message,
            },
            EgressError::ParseError(msg) => pulseboard_core::Error::Parse(msg),
            EgressError::ConfigError(msg) => pulseboard_core::Error::Config(msg),
        }
    }
}
