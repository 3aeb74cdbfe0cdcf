//! ES256 verification with ECDSA P-256

use crate::{
    compact,
    error::{JwtError, JwtResult},
    types::{ES256, JwtClaims, JwtHeader},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use p256::ecdsa::{Signature, VerifyingKey, signature::Verifier};

/// Verify a compact ES256 token against an uncompressed or compressed SEC1
/// public key and return its claims.
///
/// Only the signature is checked here; time-based claims are the caller's
/// policy.
pub fn es256_verify(public_key: &[u8], token: &str) -> JwtResult<JwtClaims> {
    let parts = compact::split(token)?;

    let verifying_key = match public_key.len() {
        33 | 65 => VerifyingKey::from_sec1_bytes(public_key)
            .map_err(|_| JwtError::invalid_key("Invalid SEC1 public key bytes"))?,
        _ => {
            return Err(JwtError::invalid_key(
                "Public key must be 33 or 65 bytes for P-256",
            ));
        }
    };

    let header: JwtHeader = compact::decode_segment(parts.header)?;
    if header.alg != ES256 {
        return Err(JwtError::unsupported_algorithm(&header.alg));
    }

    let signature_bytes = URL_SAFE_NO_PAD
        .decode(parts.signature)
        .map_err(|_| JwtError::InvalidSignature)?;
    let signature = Signature::from_slice(&signature_bytes).map_err(|_| JwtError::InvalidSignature)?;

    verifying_key
        .verify(parts.signing_input().as_bytes(), &signature)
        .map_err(|_| JwtError::InvalidSignature)?;

    // Only decode claims after signature verification succeeds
    compact::decode_segment(parts.claims)
}
