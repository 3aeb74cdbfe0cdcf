//! The active key pair and atomic rotation.
//!
//! Readers load the current pair lock-free through an [`ArcSwap`] and keep a
//! consistent snapshot for as long as they hold the `Arc`. Rotations are
//! serialized by a mutex that readers never touch, and a rotation becomes
//! visible only after the new pair has been persisted.

use crate::error::{InitError, KeyError, RotationError};
use crate::signing_key::{ActiveKeyPair, SigningKey};
use crate::store::{KeyPairStore, Slot};
use arc_swap::ArcSwap;
use keyrotor_jwt::Jose;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, warn};

/// Owns the in-memory key pair and every change to it.
pub struct KeyLifecycleManager {
    active: ArcSwap<ActiveKeyPair>,
    rotation_lock: Mutex<()>,
    store: Arc<dyn KeyPairStore>,
    jose: Arc<dyn Jose>,
}

impl KeyLifecycleManager {
    /// Load the persisted pair, or create and persist a fresh one.
    ///
    /// * both slots present: load them; a pair left half-rotated (same key in
    ///   both slots) is completed by generating a new primary
    /// * exactly one slot present: warn and replace with a fresh pair
    /// * no slots: generate and persist a fresh pair
    ///
    /// Any failure here is fatal; the caller must not start serving.
    pub fn initialize(
        store: Arc<dyn KeyPairStore>,
        jose: Arc<dyn Jose>,
    ) -> Result<Self, InitError> {
        let pair = if store.exists() {
            match store.load() {
                Ok(pair) => {
                    info!(
                        primary = pair.primary().key_id(),
                        secondary = pair.secondary().key_id(),
                        "Loaded existing key pair"
                    );
                    pair
                }
                Err(KeyError::InterruptedRotation { key_id }) => {
                    warn!(kid = %key_id, "Completing interrupted rotation");
                    let survivor = Arc::new(store.load_slot(Slot::Primary)?);
                    let primary = Arc::new(SigningKey::generate(jose.as_ref())?);
                    let pair = ActiveKeyPair::new(primary, survivor)?;
                    store.persist(&pair)?;
                    pair
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            for slot in Slot::ALL {
                if store.slot_exists(slot) {
                    warn!(%slot, "Only one key slot is persisted; generating a fresh pair");
                }
            }
            let pair = generate_pair(jose.as_ref())?;
            store.persist(&pair)?;
            info!(
                primary = pair.primary().key_id(),
                secondary = pair.secondary().key_id(),
                "Generated initial key pair"
            );
            pair
        };

        Ok(Self {
            active: ArcSwap::from_pointee(pair),
            rotation_lock: Mutex::new(()),
            store,
            jose,
        })
    }

    /// Load the persisted pair without creating, repairing or writing
    /// anything. For processes that only sign or verify.
    pub fn load(store: Arc<dyn KeyPairStore>, jose: Arc<dyn Jose>) -> Result<Self, InitError> {
        let pair = store.load()?;
        debug!(
            primary = pair.primary().key_id(),
            secondary = pair.secondary().key_id(),
            "Loaded key pair read-only"
        );
        Ok(Self {
            active: ArcSwap::from_pointee(pair),
            rotation_lock: Mutex::new(()),
            store,
            jose,
        })
    }

    /// The key new tokens are signed with.
    #[must_use]
    pub fn current_signing_key(&self) -> Arc<SigningKey> {
        Arc::clone(self.active.load().primary())
    }

    /// Both keys that tokens may currently verify against, as one snapshot.
    #[must_use]
    pub fn all_verification_keys(&self) -> Arc<ActiveKeyPair> {
        self.active.load_full()
    }

    /// Generate a new primary, demote the current primary and drop the
    /// current secondary.
    ///
    /// The new pair is persisted before it is published. On failure the
    /// previous pair stays in place both in memory and on disk, so the call
    /// can simply be retried.
    pub fn rotate(&self) -> Result<Arc<ActiveKeyPair>, RotationError> {
        // The guarded data is `()`, so a poisoned lock carries no broken state
        let _guard = self
            .rotation_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = self.active.load_full();
        let old_primary = current.primary().key_id().to_string();
        let old_secondary = current.secondary().key_id().to_string();

        let new_primary = SigningKey::generate(self.jose.as_ref())
            .map(Arc::new)
            .map_err(|e| {
                error!(error = %e, "Key rotation failed while generating");
                RotationError::Generation(e)
            })?;
        let next = current
            .rotated(new_primary)
            .map_err(RotationError::Generation)?;

        if let Err(e) = self.store.persist(&next) {
            error!(error = %e, "Key rotation failed while persisting; keeping current keys");
            return Err(RotationError::Persistence(e));
        }

        let next = Arc::new(next);
        self.active.store(Arc::clone(&next));

        info!(
            new_primary = next.primary().key_id(),
            demoted = %old_primary,
            retired = %old_secondary,
            "Rotated signing keys"
        );
        Ok(next)
    }
}

fn generate_pair(jose: &dyn Jose) -> Result<ActiveKeyPair, KeyError> {
    let primary = Arc::new(SigningKey::generate(jose)?);
    let secondary = Arc::new(SigningKey::generate(jose)?);
    ActiveKeyPair::new(primary, secondary)
}

impl std::fmt::Debug for KeyLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pair = self.active.load();
        f.debug_struct("KeyLifecycleManager")
            .field("primary", &pair.primary().key_id())
            .field("secondary", &pair.secondary().key_id())
            .finish_non_exhaustive()
    }
}
