//! Storage trait definitions

use async_trait::async_trait;
use pulseboard_core::Credential;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable home of the bearer credential. One key: present or absent.
#[async_trait]
pub trait CredentialStorage: Send + Sync {
    /// Read the persisted credential, `None` when nothing is stored
    async fn load(&self) -> StorageResult<Option<Credential>>;

    /// Persist the credential, replacing any previous one
    async fn save(&self, credential: &Credential) -> StorageResult<()>;

    /// Forget the credential. Removing a missing credential is not an error.
    async fn remove(&self) -> StorageResult<()>;
}
