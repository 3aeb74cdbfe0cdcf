//! Core types for file-based key pair storage

use super::atomic::restrict_directory;
use super::lock::DirectoryLock;
use crate::error::{KeyError, Result};
use crate::store::Slot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const METADATA_FILE: &str = "rotation.json";

/// Stores the active pair as `primary.jwk` and `secondary.jwk` in one directory.
#[derive(Debug, Clone)]
pub struct FileKeyPairStore {
    pub(super) directory: PathBuf,
}

/// Last persisted pair, for status output only. The scheduler's in-memory
/// counters remain authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationMetadata {
    /// Key ID written to the primary slot
    pub primary_kid: String,
    /// Key ID written to the secondary slot
    pub secondary_kid: String,
    /// When the pair was written
    pub updated_at: DateTime<Utc>,
}

impl FileKeyPairStore {
    /// Open (creating if needed) a store rooted at `directory`.
    ///
    /// A new directory is restricted to its owner where the platform allows.
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.exists() {
            std::fs::create_dir_all(&directory).map_err(|e| KeyError::io(&directory, e))?;
            restrict_directory(&directory);
            info!(path = %directory.display(), "Created keys directory");
        }
        Ok(Self { directory })
    }

    /// Open a store over a directory that must already hold a key pair.
    ///
    /// Nothing is created, so read-only callers never leave files behind.
    pub fn open_existing<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let store = Self {
            directory: directory.as_ref().to_path_buf(),
        };
        if !Slot::ALL.into_iter().any(|slot| store.slot_path(slot).is_file()) {
            return Err(KeyError::NotInitialized {
                path: store.directory,
            });
        }
        Ok(store)
    }

    /// Take the directory's exclusive writer lock without waiting.
    ///
    /// Fails with [`KeyError::Locked`] while another holder has it. The lock
    /// is released when the returned guard is dropped.
    pub fn lock(&self) -> Result<DirectoryLock> {
        DirectoryLock::acquire(&self.directory)
    }

    /// Directory holding the key files
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the document for `slot`
    #[must_use]
    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.directory.join(slot.file_name())
    }

    /// Path of the rotation record
    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.directory.join(METADATA_FILE)
    }

    /// Read the rotation record, if one has been written.
    pub fn read_metadata(&self) -> Result<Option<RotationMetadata>> {
        let path = self.metadata_path();
        match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| KeyError::io(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KeyError::io(&path, e)),
        }
    }
}
