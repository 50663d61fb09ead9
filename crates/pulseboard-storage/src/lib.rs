//! Pulseboard Storage
//!
//! This crate provides durable client state:
//! - Atomic file writes (temp file + fsync + rename)
//! - Credential storage backends (file, in-memory)
//! - The session store gating the authenticated view

pub mod atomic_writer;
pub mod credential;
pub mod session;
pub mod traits;

pub use credential::{FileCredentialStorage, MemoryCredentialStorage};
pub use session::SessionStore;
pub use traits::{CredentialStorage, StorageError, StorageResult};
