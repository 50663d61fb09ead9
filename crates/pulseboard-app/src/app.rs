//! Application context
//!
//! `App` owns the session and is the only writer to it. A credential in
//! memory means the dashboard is mounted; no credential means the auth form
//! is shown. Transitions between the two go through `authenticate` and
//! `logout`, which keep the poller's lifetime tied to the session's: started
//! once on sign-in, stopped once on sign-out.

use crate::auth_form::{AuthForm, AuthSubmission};
use crate::dashboard::Dashboard;
use crate::error::{AppError, AppResult};
use pulseboard_core::{Credential, CurrentUser, DateRange};
use pulseboard_egress::{AnalyticsClient, AnalyticsConfig, AuthClient, IdentityConfig};
use pulseboard_storage::{CredentialStorage, SessionStore};
use pulseboard_sync::PollerConfig;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub identity: IdentityConfig,
    pub analytics: AnalyticsConfig,
    pub poller: PollerConfig,
    /// Range the dashboard mounts with; the last seven days when unset
    pub initial_range: Option<DateRange>,
}

pub struct App {
    config: AppConfig,
    session: SessionStore,
    auth: AuthClient,
    dashboard: Option<Dashboard>,
}

impl App {
    pub fn new(config: AppConfig, storage: Arc<dyn CredentialStorage>) -> AppResult<Self> {
        let auth = AuthClient::new(config.identity.clone())?;
        Ok(Self {
            config,
            session: SessionStore::new(storage),
            auth,
            dashboard: None,
        })
    }

    /// Restore a persisted session and, if there is one, mount the dashboard
    /// without contacting the identity service.
    pub async fn init(&mut self) -> AppResult<bool> {
        if let Some(credential) = self.session.restore().await {
            self.mount(credential)?;
        }
        Ok(self.is_authenticated())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn auth_client(&self) -> &AuthClient {
        &self.auth
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    /// Run a form submission. On failure the user-facing message lands in
    /// `form.error` and is also returned.
    pub async fn submit(&mut self, form: &mut AuthForm) -> AppResult<()> {
        let submission = form.submission()?;

        form.error = None;
        form.submitting = true;
        let result = self.authenticate(submission).await;
        form.submitting = false;

        if let Err(e) = &result {
            form.error = Some(e.to_string());
        }
        result
    }

    /// Sign in (or register then sign in), persist the credential, mount the
    /// dashboard. Nothing is committed unless the whole sequence succeeded.
    pub async fn authenticate(&mut self, submission: AuthSubmission) -> AppResult<()> {
        let credential = self.sign_in(&submission).await?;
        self.mount(credential)
    }

    /// Sign in and persist the credential without mounting the dashboard
    pub async fn sign_in(&self, submission: &AuthSubmission) -> AppResult<Credential> {
        let credential = match submission {
            AuthSubmission::Login { username, password } => {
                self.auth.login(username, password).await?
            }
            AuthSubmission::Register(request) => self.auth.register(request).await?,
        };

        self.session.commit(credential.clone()).await?;
        Ok(credential)
    }

    /// Forget the session durably and in memory, then stop polling. If the
    /// durable removal fails the session stays signed in and the dashboard
    /// stays mounted.
    pub async fn logout(&mut self) -> AppResult<()> {
        self.session.clear().await?;
        self.unmount().await;
        info!("Signed out");
        Ok(())
    }

    /// Stop polling but keep the session, e.g. on process exit
    pub async fn shutdown(&mut self) {
        self.unmount().await;
    }

    /// An analytics client carrying the session's credential, for one-off
    /// reads outside the dashboard
    pub fn analytics_client(&self) -> AppResult<AnalyticsClient> {
        let credential = self.session.current().ok_or(AppError::NotAuthenticated)?;
        Ok(AnalyticsClient::new(self.config.analytics.clone())?.with_credential(credential))
    }

    pub async fn whoami(&self) -> AppResult<CurrentUser> {
        let credential = self.session.current().ok_or(AppError::NotAuthenticated)?;
        Ok(self.auth.current_user(&credential).await?)
    }

    fn mount(&mut self, credential: Credential) -> AppResult<()> {
        if self.dashboard.is_some() {
            warn!("Dashboard already mounted");
            return Ok(());
        }

        let client =
            AnalyticsClient::new(self.config.analytics.clone())?.with_credential(credential);
        let range = self.config.initial_range.unwrap_or_else(DateRange::last_week);
        self.dashboard = Some(Dashboard::start_with_range(
            Arc::new(client),
            self.config.poller.clone(),
            range,
        ));
        Ok(())
    }

    async fn unmount(&mut self) {
        if let Some(dashboard) = self.dashboard.take() {
            dashboard.stop().await;
        }
    }
}
