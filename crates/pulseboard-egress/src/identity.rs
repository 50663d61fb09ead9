//! Identity service client
//!
//! Login and registration against the user service. Failures are surfaced as
//! [`AuthError`], whose message is what the user gets to see: the service's
//! own `detail` when it sent one, a generic fallback otherwise.

use crate::client::{HttpClientConfig, create_client, endpoint, expect_success, read_json};
use crate::{EgressError, Result};
use pulseboard_core::{Credential, CurrentUser};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please try again.";
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed. Please try again.";

/// Identity service configuration
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Base URL (default: http://localhost:8000)
    pub base_url: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            client_config: HttpClientConfig::default(),
        }
    }
}

impl IdentityConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// A rejected login or registration attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    /// User-facing message
    pub message: String,
    /// HTTP status when the service answered at all
    pub status_code: Option<u16>,
}

impl AuthError {
    /// Derive the user-facing error from a transport/service failure
    pub fn from_egress(err: &EgressError, fallback: &str) -> Self {
        match err {
            EgressError::ServiceError {
                status_code,
                message,
            } => Self {
                message: extract_detail(message).unwrap_or_else(|| fallback.to_string()),
                status_code: Some(*status_code),
            },
            _ => Self {
                message: fallback.to_string(),
                status_code: None,
            },
        }
    }
}

/// Pull a string `detail` out of an error body. Validation errors carry a list
/// there instead, which is not user-presentable.
fn extract_detail(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: serde_json::Value,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail.as_str().map(str::to_string))
        .filter(|d| !d.is_empty())
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// `POST /users/` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Identity service client
pub struct AuthClient {
    config: IdentityConfig,
    client: Client,
}

impl AuthClient {
    pub fn new(config: IdentityConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Exchange username and password for a bearer credential
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> std::result::Result<Credential, AuthError> {
        self.request_token(username, password).await.map_err(|e| {
            warn!("Login rejected: {}", e);
            AuthError::from_egress(&e, LOGIN_FAILED_MESSAGE)
        })
    }

    /// Create the account only, without signing in
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn create_user(&self, request: &RegisterRequest) -> std::result::Result<(), AuthError> {
        self.post_user(request).await.map_err(|e| {
            warn!("Registration rejected: {}", e);
            AuthError::from_egress(&e, REGISTRATION_FAILED_MESSAGE)
        })
    }

    /// Create the account and sign in with the same credentials.
    ///
    /// Either step failing fails the whole operation; an account created by a
    /// failed auto-login stays created.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> std::result::Result<Credential, AuthError> {
        let outcome = async {
            self.post_user(request).await?;
            info!("Account created, signing in");
            self.request_token(&request.username, &request.password)
                .await
        }
        .await;

        outcome.map_err(|e| {
            warn!("Registration flow failed: {}", e);
            AuthError::from_egress(&e, REGISTRATION_FAILED_MESSAGE)
        })
    }

    /// `GET /users/me` with the given credential
    #[instrument(skip(self, credential))]
    pub async fn current_user(&self, credential: &Credential) -> Result<CurrentUser> {
        let response = self
            .client
            .get(endpoint(&self.config.base_url, "/users/me"))
            .header("Authorization", credential.bearer_header())
            .send()
            .await?;
        read_json(response, "current user").await
    }

    async fn request_token(&self, username: &str, password: &str) -> Result<Credential> {
        debug!("POST {}/login", self.config.base_url);
        let response = self
            .client
            .post(endpoint(&self.config.base_url, "/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let body: LoginResponse = read_json(response, "login").await?;
        if body.access_token.is_empty() {
            return Err(EgressError::ParseError(
                "login: empty access_token".to_string(),
            ));
        }
        Ok(Credential::new(body.access_token))
    }

    async fn post_user(&self, request: &RegisterRequest) -> Result<()> {
        debug!("POST {}/users/", self.config.base_url);
        let response = self
            .client
            .post(endpoint(&self.config.base_url, "/users/"))
            .json(request)
            .send()
            .await?;
        expect_success(response, "register").await
    }
}
