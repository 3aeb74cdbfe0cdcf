//! ES256 signing with ECDSA P-256

use crate::{
    compact,
    error::{JwtError, JwtResult},
    types::{JwtClaims, JwtHeader},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use p256::ecdsa::{Signature, SigningKey, signature::Signer};

/// Sign `claims` under `header` with a raw 32-byte P-256 scalar.
///
/// The signature is the fixed-width `r || s` form JWS requires (RFC 7518 §3.4),
/// not DER.
pub fn es256_sign(private_key: &[u8], header: &JwtHeader, claims: &JwtClaims) -> JwtResult<String> {
    if private_key.len() != 32 {
        return Err(JwtError::invalid_key(
            "Private key must be 32 bytes for P-256",
        ));
    }
    let signing_key = SigningKey::from_slice(private_key)
        .map_err(|_| JwtError::invalid_key("Invalid P-256 private key bytes"))?;

    let header_b64 = compact::encode_segment(header)?;
    let claims_b64 = compact::encode_segment(claims)?;

    let mut signing_input = String::with_capacity(header_b64.len() + 1 + claims_b64.len());
    signing_input.push_str(&header_b64);
    signing_input.push('.');
    signing_input.push_str(&claims_b64);

    let signature: Signature = signing_key
        .try_sign(signing_input.as_bytes())
        .map_err(|e| JwtError::signing_error(&e.to_string()))?;
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());

    let mut jwt = String::with_capacity(signing_input.len() + 1 + signature_b64.len());
    jwt.push_str(&signing_input);
    jwt.push('.');
    jwt.push_str(&signature_b64);

    Ok(jwt)
}
