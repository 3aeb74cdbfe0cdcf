//! Error handling for the key lifecycle

use crate::store::Slot;
use keyrotor_jwt::JwtError;
use std::path::PathBuf;
use thiserror::Error;

/// Key store and key material errors
#[derive(Debug, Error)]
pub enum KeyError {
    /// Reading or writing a key file failed
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A key file is missing or is not a well-formed private key document
    #[error("Malformed {slot} key document {}: {reason}", .path.display())]
    Parse {
        /// Slot the document belongs to
        slot: Slot,
        /// File that failed to parse
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Both slots hold the same key: a rotation stopped between its two writes
    #[error("Both key slots hold {key_id}; the last rotation was interrupted")]
    InterruptedRotation {
        /// Key ID found in both slots
        key_id: String,
    },

    /// Another process holds the key directory for writing
    #[error("Key directory {} is locked by another process", .path.display())]
    Locked {
        /// Lock file
        path: PathBuf,
    },

    /// No key pair has been persisted yet
    #[error("No key pair found in {}", .path.display())]
    NotInitialized {
        /// Key directory
        path: PathBuf,
    },

    /// An active pair was assembled from two keys with the same ID
    #[error("Primary and secondary share key ID {0}")]
    DuplicateKeyId(String),

    /// The JOSE capability could not produce a key
    #[error("Key generation failed: {0}")]
    Generation(#[source] JwtError),

    /// Key material was rejected by the JOSE layer
    #[error("Invalid key material: {0}")]
    Jose(#[from] JwtError),
}

impl KeyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(slot: Slot, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            slot,
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for key operations
pub type Result<T> = std::result::Result<T, KeyError>;

/// Boot-fatal: the persisted pair could not be loaded or the initial pair
/// could not be created. The process must not start serving.
#[derive(Debug, Error)]
#[error("Key store initialization failed: {0}")]
pub struct InitError(#[from] pub KeyError);

/// A rotation attempt failed; the previous pair is still authoritative and the
/// attempt can be retried.
#[derive(Debug, Error)]
pub enum RotationError {
    /// The new primary key could not be generated
    #[error("Generating the new primary key failed: {0}")]
    Generation(#[source] KeyError),

    /// The rotated pair could not be written to the store
    #[error("Persisting the rotated key pair failed: {0}")]
    Persistence(#[source] KeyError),
}
