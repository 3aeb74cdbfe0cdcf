//! File-based key pair storage
//!
//! One private JWK per slot under a single directory, each replaced through an
//! atomic temp-file rename, plus an observability-only rotation record.

mod atomic;
mod core;
mod lock;
mod storage_traits;

pub use self::core::{FileKeyPairStore, RotationMetadata};
pub use self::lock::DirectoryLock;
