//! Pulseboard App
//!
//! The application context the presentation layer drives:
//! - `App`: owns the session and decides between the signed-out and
//!   signed-in views
//! - `AuthForm` / `AuthMode`: the shared login/registration form
//! - `Dashboard`: the signed-in view, its date range and its poller

pub mod app;
pub mod auth_form;
pub mod dashboard;
pub mod error;

pub use app::{App, AppConfig};
pub use auth_form::{AuthForm, AuthMode, AuthSubmission, FormError};
pub use dashboard::{Dashboard, DashboardView};
pub use error::{AppError, AppResult};
