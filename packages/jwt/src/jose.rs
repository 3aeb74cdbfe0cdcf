//! ES256 implementation of the [`Jose`] capability.

use crate::{
    crypto,
    error::JwtResult,
    traits::Jose,
    types::{Curve, ES256, Es256KeyPair, JwtClaims, JwtHeader},
};
use tracing::debug;

/// ECDSA P-256 / SHA-256 backed by the `p256` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Es256Jose;

impl Es256Jose {
    /// New capability handle
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Jose for Es256Jose {
    fn generate(&self, curve: Curve) -> JwtResult<Es256KeyPair> {
        crypto::es256_generate_keys(curve)
    }

    fn sign(&self, claims: &JwtClaims, kid: &str, key: &Es256KeyPair) -> JwtResult<String> {
        let header = JwtHeader::new(ES256).with_key_id(kid);
        crypto::es256_sign(&key.private_key, &header, claims)
    }

    fn verify(&self, token: &str, public_key: &[u8]) -> bool {
        match crypto::es256_verify(public_key, token) {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "ES256 verification failed");
                false
            }
        }
    }

    fn alg(&self) -> &'static str {
        ES256
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_with_matching_key_only() {
        let jose = Es256Jose::new();
        let key = jose.generate(Curve::P256).unwrap();
        let other = jose.generate(Curve::P256).unwrap();
        let claims = JwtClaims::new().with_subject("svc-a").with_lifetime(10, 20);

        let token = jose.sign(&claims, "d-key-a", &key).unwrap();

        assert!(jose.verify(&token, &key.public_key));
        assert!(!jose.verify(&token, &other.public_key));
        assert_eq!(jose.alg(), "ES256");
    }

    #[test]
    fn header_carries_kid_and_alg() {
        let jose = Es256Jose::new();
        let key = jose.generate(Curve::P256).unwrap();
        let token = jose.sign(&JwtClaims::new(), "d-key-kid", &key).unwrap();

        let header = crate::compact::decode_header(&token).unwrap();
        assert_eq!(header.kid.as_deref(), Some("d-key-kid"));
        assert_eq!(header.alg, "ES256");
        assert_eq!(header.typ, "JWT");
    }

    #[test]
    fn tampered_claims_do_not_verify() {
        let jose = Es256Jose::new();
        let key = jose.generate(Curve::P256).unwrap();
        let token = jose
            .sign(&JwtClaims::new().with_subject("alice"), "k", &key)
            .unwrap();

        let forged =
            crate::compact::encode_segment(&JwtClaims::new().with_subject("mallory")).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged;
        let forged_token = parts.join(".");

        assert!(!jose.verify(&forged_token, &key.public_key));
        assert!(!jose.verify("not-a-token", &key.public_key));
    }
}
