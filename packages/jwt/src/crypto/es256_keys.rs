//! ES256 key generation for ECDSA P-256

use crate::{
    error::{JwtError, JwtResult},
    types::{Curve, Es256KeyPair},
};

/// Generate a key pair on `curve` and check it before handing it out.
pub fn es256_generate_keys(curve: Curve) -> JwtResult<Es256KeyPair> {
    let keypair = match curve {
        Curve::P256 => crate::algorithms::generate_es256_keypair()?,
    };

    crate::algorithms::validate_es256_keypair(&keypair).map_err(|e| {
        JwtError::KeyGeneration(format!("generated {curve} key pair failed validation: {e}"))
    })?;

    Ok(keypair)
}
