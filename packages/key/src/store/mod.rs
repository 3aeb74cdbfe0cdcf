//! Durable storage for the active key pair

mod file_store;

pub use file_store::{DirectoryLock, FileKeyPairStore, RotationMetadata};

use crate::error::{KeyError, Result};
use crate::signing_key::{ActiveKeyPair, SigningKey};
use std::fmt;
use std::sync::Arc;

/// One of the two key slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Signs new tokens
    Primary,
    /// Verifies tokens signed before the last rotation
    Secondary,
}

impl Slot {
    /// Both slots
    pub const ALL: [Slot; 2] = [Slot::Primary, Slot::Secondary];

    /// File name of the slot's key document
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Slot::Primary => "primary.jwk",
            Slot::Secondary => "secondary.jwk",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Primary => f.write_str("primary"),
            Slot::Secondary => f.write_str("secondary"),
        }
    }
}

/// Persistence for exactly two keys, one per slot.
pub trait KeyPairStore: Send + Sync {
    /// Whether `slot` has a persisted document
    fn slot_exists(&self, slot: Slot) -> bool;

    /// Load the key in `slot`
    fn load_slot(&self, slot: Slot) -> Result<SigningKey>;

    /// Write both keys. Each slot write replaces its previous content
    /// atomically; the secondary slot is written before the primary.
    fn persist(&self, pair: &ActiveKeyPair) -> Result<()>;

    /// True iff both slots are persisted
    fn exists(&self) -> bool {
        Slot::ALL.into_iter().all(|slot| self.slot_exists(slot))
    }

    /// Load both slots.
    ///
    /// Returns [`KeyError::InterruptedRotation`] when both slots hold the same
    /// key, which is what a crash between the secondary and primary writes
    /// leaves behind.
    fn load(&self) -> Result<ActiveKeyPair> {
        let primary = self.load_slot(Slot::Primary)?;
        let secondary = self.load_slot(Slot::Secondary)?;
        if primary.key_id() == secondary.key_id() {
            return Err(KeyError::InterruptedRotation {
                key_id: primary.key_id().to_string(),
            });
        }
        ActiveKeyPair::new(Arc::new(primary), Arc::new(secondary))
    }
}
