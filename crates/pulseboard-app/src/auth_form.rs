//! Shared login / registration form
//!
//! One form, two modes. The mode decides which fields are required and which
//! sequence of identity calls a submission runs.

use pulseboard_egress::RegisterRequest;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AuthMode::Login => "Login",
            AuthMode::Register => "Register",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("A submission is already in progress")]
    Busy,
}

/// Validated form contents, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSubmission {
    Login { username: String, password: String },
    Register(RegisterRequest),
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub username: String,
    pub password: String,
    /// Register mode only
    pub email: String,
    /// Register mode only, optional
    pub full_name: String,
    /// Last failure, shown above the form
    pub error: Option<String>,
    pub submitting: bool,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Switch between login and registration, dropping any shown error
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.error = None;
    }

    pub fn submission(&self) -> Result<AuthSubmission, FormError> {
        if self.submitting {
            return Err(FormError::Busy);
        }

        let username = required("Username", &self.username)?;
        let password = required("Password", &self.password)?;

        match self.mode {
            AuthMode::Login => Ok(AuthSubmission::Login { username, password }),
            AuthMode::Register => {
                let email = required("Email", &self.email)?;
                let full_name = Some(self.full_name.trim())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string);
                Ok(AuthSubmission::Register(RegisterRequest {
                    username,
                    email,
                    password,
                    full_name,
                }))
            }
        }
    }
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    if value.trim().is_empty() {
        Err(FormError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(mode: AuthMode) -> AuthForm {
        AuthForm {
            mode,
            username: "ada".to_string(),
            password: "hunter2".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_login_needs_username_and_password() {
        let form = filled(AuthMode::Login);
        assert_eq!(
            form.submission().unwrap(),
            AuthSubmission::Login {
                username: "ada".to_string(),
                password: "hunter2".to_string()
            }
        );

        let mut missing = form.clone();
        missing.password.clear();
        assert_eq!(
            missing.submission(),
            Err(FormError::MissingField("Password"))
        );
    }

    #[test]
    fn test_register_requires_email() {
        let form = filled(AuthMode::Register);
        assert_eq!(form.submission(), Err(FormError::MissingField("Email")));
    }

    #[test]
    fn test_register_full_name_is_optional() {
        let mut form = filled(AuthMode::Register);
        form.email = "ada@example.com".to_string();

        match form.submission().unwrap() {
            AuthSubmission::Register(request) => {
                assert_eq!(request.email, "ada@example.com");
                assert!(request.full_name.is_none());
            }
            other => panic!("expected register submission, got {:?}", other),
        }

        form.full_name = "Ada Lovelace".to_string();
        match form.submission().unwrap() {
            AuthSubmission::Register(request) => {
                assert_eq!(request.full_name.as_deref(), Some("Ada Lovelace"));
            }
            other => panic!("expected register submission, got {:?}", other),
        }
    }

    #[test]
    fn test_login_ignores_register_fields() {
        let mut form = filled(AuthMode::Login);
        form.email = String::new();
        assert!(form.submission().is_ok());
    }

    #[test]
    fn test_toggle_clears_error() {
        let mut form = filled(AuthMode::Login);
        form.error = Some("Incorrect username or password".to_string());

        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::Register);
        assert!(form.error.is_none());

        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::Login);
    }

    #[test]
    fn test_no_double_submit() {
        let mut form = filled(AuthMode::Login);
        form.submitting = true;
        assert_eq!(form.submission(), Err(FormError::Busy));
    }
}
