//! The JOSE capability seam.

use crate::error::JwtResult;
use crate::types::{Curve, Es256KeyPair, JwtClaims};

/// Key generation, signing and verification, injected into the key lifecycle
/// so it never depends on a concrete crypto library.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait Jose: Send + Sync + 'static {
    /// Generate a fresh key pair on `curve`.
    fn generate(&self, curve: Curve) -> JwtResult<Es256KeyPair>;

    /// Sign `claims` with `key`, embedding `kid` in the protected header.
    fn sign(&self, claims: &JwtClaims, kid: &str, key: &Es256KeyPair) -> JwtResult<String>;

    /// True iff `token` carries a valid signature for `public_key`.
    fn verify(&self, token: &str, public_key: &[u8]) -> bool;

    /// Header `alg` value.
    fn alg(&self) -> &'static str;
}

impl<T: Jose> Jose for std::sync::Arc<T> {
    fn generate(&self, curve: Curve) -> JwtResult<Es256KeyPair> {
        (**self).generate(curve)
    }

    fn sign(&self, claims: &JwtClaims, kid: &str, key: &Es256KeyPair) -> JwtResult<String> {
        (**self).sign(claims, kid, key)
    }

    fn verify(&self, token: &str, public_key: &[u8]) -> bool {
        (**self).verify(token, public_key)
    }

    fn alg(&self) -> &'static str {
        (**self).alg()
    }
}
