//! Credential storage backends

use crate::atomic_writer::AtomicWriter;
use crate::traits::{CredentialStorage, StorageError, StorageResult};
use async_trait::async_trait;
use pulseboard_core::Credential;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// On-disk shape of the session file
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    access_token: String,
}

/// Credential persisted as a small JSON file, written atomically
#[derive(Debug, Clone)]
pub struct FileCredentialStorage {
    path: PathBuf,
}

impl FileCredentialStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStorage for FileCredentialStorage {
    async fn load(&self) -> StorageResult<Option<Credential>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedSession = serde_json::from_str(&content).map_err(|e| {
            StorageError::InvalidData(format!(
                "Failed to parse session file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if persisted.access_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(Credential::new(persisted.access_token)))
    }

    async fn save(&self, credential: &Credential) -> StorageResult<()> {
        let content = serde_json::to_vec_pretty(&PersistedSession {
            access_token: credential.expose().to_string(),
        })
        .map_err(|e| StorageError::Serialization(format!("Failed to serialize session: {}", e)))?;

        let mut writer = AtomicWriter::new(&self.path)?;
        writer.write(&content)?;
        writer.commit()?;

        debug!("Session written to {}", self.path.display());
        Ok(())
    }

    async fn remove(&self) -> StorageResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryCredentialStorage {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded storage, as if a previous run had logged in
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

#[async_trait]
impl CredentialStorage for MemoryCredentialStorage {
    async fn load(&self) -> StorageResult<Option<Credential>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    async fn save(&self, credential: &Credential) -> StorageResult<()> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credential.clone());
        Ok(())
    }

    async fn remove(&self) -> StorageResult<()> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}
