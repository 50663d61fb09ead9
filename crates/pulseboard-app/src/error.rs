use pulseboard_egress::{AuthError, EgressError};
use pulseboard_storage::StorageError;
use thiserror::Error;

use crate::auth_form::FormError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Form(#[from] FormError),

    /// Rejected by the identity service; the message is user-facing
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Egress(#[from] EgressError),

    #[error("Not signed in")]
    NotAuthenticated,
}
