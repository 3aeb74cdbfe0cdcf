//! Exclusive writer lock on a key directory

use crate::error::{KeyError, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

const LOCK_FILE: &str = ".keyrotor.lock";

/// Advisory lock held by the one process allowed to write a key directory.
///
/// Other processes can still read the key files; only writers must hold it.
#[derive(Debug)]
pub struct DirectoryLock {
    file: File,
    path: PathBuf,
}

impl DirectoryLock {
    pub(super) fn acquire(directory: &Path) -> Result<Self> {
        let path = directory.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| KeyError::io(&path, e))?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(true) => {
                debug!(path = %path.display(), "Acquired key directory lock");
                Ok(Self { file, path })
            }
            Ok(false) => Err(KeyError::Locked { path }),
            Err(e) => Err(KeyError::io(&path, e)),
        }
    }

    /// Lock file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!(path = %self.path.display(), error = %e, "Releasing key directory lock failed");
        }
    }
}
