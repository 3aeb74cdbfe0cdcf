//! Public key-set publication

use keyrotor_jwt::JwkSet;
use keyrotor_key::KeyLifecycleManager;
use std::sync::Arc;

/// Serves the public halves of both active keys as a JWK set.
#[derive(Debug, Clone)]
pub struct KeySetPublisher {
    manager: Arc<KeyLifecycleManager>,
}

impl KeySetPublisher {
    /// Publisher over `manager`'s keys
    #[must_use]
    pub fn new(manager: Arc<KeyLifecycleManager>) -> Self {
        Self { manager }
    }

    /// `{"keys": [primary, secondary]}` from one consistent snapshot, with
    /// no private material.
    #[must_use]
    pub fn key_set(&self) -> JwkSet {
        let pair = self.manager.all_verification_keys();
        JwkSet {
            keys: pair
                .keys()
                .into_iter()
                .map(|key| key.public_jwk().to_public())
                .collect(),
        }
    }

    /// The key set as a JSON document
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.key_set())
    }
}
