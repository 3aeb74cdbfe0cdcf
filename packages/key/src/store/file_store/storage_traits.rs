//! [`KeyPairStore`] implementation for [`FileKeyPairStore`]

use super::atomic::write_atomic;
use super::core::{FileKeyPairStore, RotationMetadata};
use crate::error::{KeyError, Result};
use crate::signing_key::{ActiveKeyPair, SigningKey};
use crate::store::{KeyPairStore, Slot};
use chrono::{DateTime, Utc};
use keyrotor_jwt::EcJwk;
use tracing::{debug, warn};

impl FileKeyPairStore {
    fn write_slot(&self, slot: Slot, key: &SigningKey) -> Result<()> {
        let path = self.slot_path(slot);
        let document = serde_json::to_vec_pretty(&key.to_private_jwk()?)
            .map_err(|e| KeyError::parse(slot, &path, e.to_string()))?;
        write_atomic(&self.directory, &path, &document).map_err(|e| KeyError::io(&path, e))?;
        debug!(%slot, kid = key.key_id(), "Wrote key slot");
        Ok(())
    }

    fn write_metadata(&self, pair: &ActiveKeyPair) {
        let record = RotationMetadata {
            primary_kid: pair.primary().key_id().to_string(),
            secondary_kid: pair.secondary().key_id().to_string(),
            updated_at: Utc::now(),
        };
        let path = self.metadata_path();
        let result = serde_json::to_vec_pretty(&record)
            .map_err(std::io::Error::other)
            .and_then(|bytes| write_atomic(&self.directory, &path, &bytes));
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Failed to write rotation metadata");
        }
    }
}

impl KeyPairStore for FileKeyPairStore {
    fn slot_exists(&self, slot: Slot) -> bool {
        self.slot_path(slot).is_file()
    }

    fn load_slot(&self, slot: Slot) -> Result<SigningKey> {
        let path = self.slot_path(slot);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(KeyError::parse(slot, &path, "key file is missing"));
            }
            Err(e) => return Err(KeyError::io(&path, e)),
        };

        let jwk: EcJwk = serde_json::from_str(&contents)
            .map_err(|e| KeyError::parse(slot, &path, e.to_string()))?;
        if !jwk.is_private() {
            return Err(KeyError::parse(slot, &path, "document has no private key"));
        }

        // Documents without `iat` fall back to the file's modification time
        let fallback_created_at = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        SigningKey::from_private_jwk(&jwk, fallback_created_at)
            .map_err(|e| KeyError::parse(slot, &path, e.to_string()))
    }

    fn persist(&self, pair: &ActiveKeyPair) -> Result<()> {
        // Secondary first: a crash between the writes leaves the outgoing
        // primary in both slots, which `load` detects, instead of losing it.
        self.write_slot(Slot::Secondary, pair.secondary())?;
        self.write_slot(Slot::Primary, pair.primary())?;
        self.write_metadata(pair);
        Ok(())
    }
}
