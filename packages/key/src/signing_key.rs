//! Signing keys and the two-slot active pair

use crate::error::{KeyError, Result};
use crate::key_id::generate_key_id;
use chrono::{DateTime, Utc};
use keyrotor_jwt::{Curve, EcJwk, Es256KeyPair, Jose, ES256};
use std::fmt;
use std::sync::Arc;

/// An ES256 key pair with its identity. Immutable once built; rotation only
/// moves keys between slots.
pub struct SigningKey {
    key_id: String,
    created_at: DateTime<Utc>,
    keypair: Es256KeyPair,
    public_jwk: EcJwk,
}

impl SigningKey {
    /// Wrap validated key material.
    pub fn new(key_id: String, created_at: DateTime<Utc>, keypair: Es256KeyPair) -> Result<Self> {
        keyrotor_jwt::validate_es256_keypair(&keypair)?;
        let public_jwk =
            EcJwk::from_keypair(&key_id, &keypair, Some(created_at.timestamp()))?.to_public();
        Ok(Self {
            key_id,
            created_at,
            keypair,
            public_jwk,
        })
    }

    /// Generate a fresh P-256 key with a new random key ID.
    pub fn generate(jose: &dyn Jose) -> Result<Self> {
        let keypair = jose.generate(Curve::P256).map_err(KeyError::Generation)?;
        Self::new(generate_key_id(), Utc::now(), keypair)
    }

    /// Rebuild a key from its persisted private JWK. `fallback_created_at` is
    /// used when the document carries no `iat`.
    pub fn from_private_jwk(jwk: &EcJwk, fallback_created_at: DateTime<Utc>) -> Result<Self> {
        let keypair = jwk.to_keypair()?;
        let created_at = jwk
            .iat
            .and_then(|iat| DateTime::from_timestamp(iat, 0))
            .unwrap_or(fallback_created_at);
        Self::new(jwk.kid.clone(), created_at, keypair)
    }

    /// The `kid` this key signs under
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Always `ES256`
    #[must_use]
    pub fn algorithm(&self) -> &'static str {
        ES256
    }

    /// When the key was generated
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Private and public material, for the signer only.
    #[must_use]
    pub fn keypair(&self) -> &Es256KeyPair {
        &self.keypair
    }

    /// Uncompressed SEC1 public point
    #[must_use]
    pub fn public_key(&self) -> &[u8] {
        &self.keypair.public_key
    }

    /// Public JWK, safe to publish
    #[must_use]
    pub fn public_jwk(&self) -> &EcJwk {
        &self.public_jwk
    }

    /// Private JWK, for the key store only
    pub fn to_private_jwk(&self) -> Result<EcJwk> {
        Ok(EcJwk::from_keypair(
            &self.key_id,
            &self.keypair,
            Some(self.created_at.timestamp()),
        )?)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &ES256)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// The primary (signing) and secondary (verify-only) keys.
///
/// The two slots never hold the same key ID.
#[derive(Debug, Clone)]
pub struct ActiveKeyPair {
    primary: Arc<SigningKey>,
    secondary: Arc<SigningKey>,
}

impl ActiveKeyPair {
    /// Pair two keys; fails if they share a key ID.
    pub fn new(primary: Arc<SigningKey>, secondary: Arc<SigningKey>) -> Result<Self> {
        if primary.key_id() == secondary.key_id() {
            return Err(KeyError::DuplicateKeyId(primary.key_id().to_string()));
        }
        Ok(Self { primary, secondary })
    }

    /// The pair after a rotation: `new_primary` signs, the current primary is
    /// demoted, the current secondary is dropped.
    pub fn rotated(&self, new_primary: Arc<SigningKey>) -> Result<Self> {
        Self::new(new_primary, Arc::clone(&self.primary))
    }

    /// The signing key
    #[must_use]
    pub fn primary(&self) -> &Arc<SigningKey> {
        &self.primary
    }

    /// The previous signing key, kept for verification
    #[must_use]
    pub fn secondary(&self) -> &Arc<SigningKey> {
        &self.secondary
    }

    /// Both keys, primary first
    #[must_use]
    pub fn keys(&self) -> [&Arc<SigningKey>; 2] {
        [&self.primary, &self.secondary]
    }

    /// The key with `key_id`, if it is in either slot
    #[must_use]
    pub fn find(&self, key_id: &str) -> Option<&Arc<SigningKey>> {
        self.keys().into_iter().find(|key| key.key_id() == key_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyrotor_jwt::Es256Jose;

    fn fresh() -> Arc<SigningKey> {
        Arc::new(SigningKey::generate(&Es256Jose::new()).unwrap())
    }

    #[test]
    fn pair_rejects_same_key_in_both_slots() {
        let key = fresh();
        let err = ActiveKeyPair::new(Arc::clone(&key), key).unwrap_err();
        assert!(matches!(err, KeyError::DuplicateKeyId(_)));
    }

    #[test]
    fn rotated_demotes_primary_and_drops_secondary() {
        let (a, b, c) = (fresh(), fresh(), fresh());
        let pair = ActiveKeyPair::new(Arc::clone(&a), Arc::clone(&b)).unwrap();

        let next = pair.rotated(Arc::clone(&c)).unwrap();

        assert_eq!(next.primary().key_id(), c.key_id());
        assert_eq!(next.secondary().key_id(), a.key_id());
        assert!(next.find(b.key_id()).is_none());
        // The original value is untouched
        assert_eq!(pair.primary().key_id(), a.key_id());
    }

    #[test]
    fn private_jwk_round_trip_keeps_identity() {
        let key = fresh();
        let jwk = key.to_private_jwk().unwrap();

        let restored = SigningKey::from_private_jwk(&jwk, Utc::now()).unwrap();

        assert_eq!(restored.key_id(), key.key_id());
        assert_eq!(restored.public_key(), key.public_key());
        assert_eq!(restored.created_at().timestamp(), key.created_at().timestamp());
        assert!(!key.public_jwk().is_private());
    }

    #[test]
    fn debug_never_prints_material() {
        let key = fresh();
        let jwk = key.to_private_jwk().unwrap();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains(jwk.d.as_deref().unwrap()));
        assert!(rendered.contains(key.key_id()));
    }
}
