//! # Two-slot signing key lifecycle
//!
//! Owns the primary (signing) and secondary (verify-only) ES256 keys of a
//! token service: their on-disk form, their atomic rotation, and the timer
//! that rotates them.
//!
//! ## Features
//!
//! - **Key Store**: one private JWK per slot, replaced through atomic renames
//! - **Lifecycle**: lock-free reads, serialized rotations, persist-then-publish
//! - **Scheduling**: fixed-delay tokio timer plus manual triggering
//! - **Writer lock**: one process at a time may write a key directory
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keyrotor_jwt::Es256Jose;
//! use keyrotor_key::{FileKeyPairStore, KeyLifecycleManager};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(FileKeyPairStore::open("./keys")?);
//! let manager = KeyLifecycleManager::initialize(store, Arc::new(Es256Jose::new()))?;
//!
//! let signing = manager.current_signing_key();
//! manager.rotate()?;
//! assert_eq!(manager.all_verification_keys().secondary().key_id(), signing.key_id());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod key_id;
pub mod lifecycle;
pub mod scheduler;
pub mod signing_key;
pub mod store;

pub use error::{InitError, KeyError, Result, RotationError};
pub use key_id::{KEY_ID_PREFIX, generate_key_id};
pub use lifecycle::KeyLifecycleManager;
pub use scheduler::{
    RotationScheduler, RotationSettings, RotationStats, RotationTask, ScheduledRotation,
};
pub use signing_key::{ActiveKeyPair, SigningKey};
pub use store::{DirectoryLock, FileKeyPairStore, KeyPairStore, RotationMetadata, Slot};
