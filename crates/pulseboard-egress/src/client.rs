//! Shared HTTP client utilities

use crate::{EgressError, Result};
use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds. `None` keeps the transport default
    /// (no timeout), so a hung request keeps its cycle pending.
    pub timeout_secs: Option<u64>,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 8,
            user_agent: format!("Pulseboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client with connection pooling
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        // Expire idle connections before the services close them
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .tcp_keepalive(Duration::from_secs(60));

    if let Some(timeout_secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }

    builder
        .build()
        .map_err(|e| EgressError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Join a base URL and an absolute path without doubling the slash
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Turn a response into a typed payload.
///
/// Non-2xx statuses become [`EgressError::ServiceError`] carrying the raw
/// body; a 2xx body that does not match `T` becomes
/// [`EgressError::ParseError`].
pub async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    debug!("{} response status: {}", what, status);

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());
        return Err(EgressError::ServiceError {
            status_code: status.as_u16(),
            message: body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice::<T>(&bytes)
        .map_err(|e| EgressError::ParseError(format!("{}: {}", what, e)))
}

/// Drain a response whose body is not needed, keeping only the status check
pub async fn expect_success(response: Response, what: &str) -> Result<()> {
    let status = response.status();
    debug!("{} response status: {}", what, status);

    if status.is_success() {
        return Ok(());
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error body".to_string());
    Err(EgressError::ServiceError {
        status_code: status.as_u16(),
        message: body,
    })
}
