//! Session store
//!
//! Owns the current credential. Presence of an in-memory credential is the
//! only signal the rest of the client uses to decide between the signed-out
//! and signed-in views; nothing here validates or expires tokens.
//!
//! Durable storage always changes first. The in-memory value is published
//! only after the durable write succeeded, so a crash can never leave a
//! session that is live in memory but missing on disk (or the reverse).

use crate::traits::{CredentialStorage, StorageResult};
use pulseboard_core::Credential;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub struct SessionStore {
    storage: Arc<dyn CredentialStorage>,
    current: watch::Sender<Option<Credential>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        let (current, _) = watch::channel(None);
        Self { storage, current }
    }

    /// Load the persisted credential into memory. Unreadable storage counts as
    /// signed out.
    pub async fn restore(&self) -> Option<Credential> {
        let restored = match self.storage.load().await {
            Ok(credential) => credential,
            Err(e) => {
                warn!("Ignoring unreadable session storage: {}", e);
                None
            }
        };

        if restored.is_some() {
            info!("Restored persisted session");
        }
        self.current.send_replace(restored.clone());
        restored
    }

    /// Persist and activate a credential
    pub async fn commit(&self, credential: Credential) -> StorageResult<()> {
        self.storage.save(&credential).await?;
        self.current.send_replace(Some(credential));
        info!("Session committed");
        Ok(())
    }

    /// Forget the credential durably and in memory
    pub async fn clear(&self) -> StorageResult<()> {
        self.storage.remove().await?;
        self.current.send_replace(None);
        info!("Session cleared");
        Ok(())
    }

    pub fn current(&self) -> Option<Credential> {
        self.current.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Observe sign-in / sign-out transitions
    pub fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.current.subscribe()
    }
}
