//! Crash-safe replacement of small files
//!
//! Data goes to a uniquely named temp file next to the target, is synced,
//! then renamed over the target. Readers see either the old file or the
//! complete new one. The temp file is created owner read/write only on unix,
//! so a credential is never briefly world-readable.

use crate::traits::StorageResult;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Dropping a writer without committing removes its temp file.
pub struct AtomicWriter {
    final_path: PathBuf,
    temp: NamedTempFile,
}

impl AtomicWriter {
    /// Open a temp file in the target's directory, creating the directory
    /// if needed
    pub fn new<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let final_path = path.as_ref().to_path_buf();

        let dir = match final_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let temp = tempfile::Builder::new()
            .prefix(".pulseboard-")
            .suffix(".tmp")
            .tempfile_in(&dir)?;

        Ok(Self { final_path, temp })
    }

    pub fn write(&mut self, data: &[u8]) -> StorageResult<()> {
        self.temp.write_all(data)?;
        Ok(())
    }

    /// Sync and rename into place. The temp file's handle is closed before
    /// this returns.
    pub fn commit(mut self) -> StorageResult<()> {
        self.temp.flush()?;
        self.temp.as_file().sync_all()?;

        let file = self.temp.persist(&self.final_path).map_err(|e| e.error)?;
        drop(file);
        Ok(())
    }
}
