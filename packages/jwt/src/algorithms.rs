//! ES256 key generation and key-pair validation

use crate::error::{JwtError, JwtResult};
use crate::types::Es256KeyPair;
use p256::ecdsa::{SigningKey, VerifyingKey};
use zeroize::Zeroizing;

/// A random 32-byte string is a valid P-256 scalar with overwhelming probability;
/// the bound only keeps a broken entropy source from looping forever.
const MAX_SCALAR_ATTEMPTS: usize = 8;

/// Generate a new ES256 key pair from system entropy.
pub fn generate_es256_keypair() -> JwtResult<Es256KeyPair> {
    use rand::Rng;

    let mut rng = rand::rng();
    for _ in 0..MAX_SCALAR_ATTEMPTS {
        let mut private_key_bytes = Zeroizing::new([0u8; 32]);
        rng.fill(&mut *private_key_bytes);

        // Zero or >= n is rejected; draw again
        if let Ok(signing_key) = SigningKey::from_slice(&private_key_bytes[..]) {
            return Ok(keypair_from_signing_key(&signing_key));
        }
    }

    Err(JwtError::KeyGeneration(
        "entropy source produced no valid P-256 scalar".to_string(),
    ))
}

/// Build the raw-scalar / uncompressed-point pair for a signing key.
pub(crate) fn keypair_from_signing_key(signing_key: &SigningKey) -> Es256KeyPair {
    let private_key = Zeroizing::new(signing_key.to_bytes().to_vec());

    // Uncompressed point: 0x04 + 32-byte x + 32-byte y
    let public_key = signing_key
        .verifying_key()
        .to_encoded_point(false)
        .as_bytes()
        .to_vec();

    Es256KeyPair {
        private_key,
        public_key,
    }
}

/// Validate an ES256 key pair: well-formed scalar, well-formed point, and the
/// point is the one the scalar derives.
pub fn validate_es256_keypair(keypair: &Es256KeyPair) -> JwtResult<()> {
    if keypair.private_key.len() != 32 {
        return Err(JwtError::invalid_key(
            "Private key must be 32 bytes for P-256",
        ));
    }
    let signing_key = SigningKey::from_slice(&keypair.private_key)
        .map_err(|_| JwtError::invalid_key("Invalid P-256 private key bytes"))?;

    if keypair.public_key.len() != 65 || keypair.public_key[0] != 0x04 {
        return Err(JwtError::invalid_key(
            "Public key must be a 65-byte uncompressed P-256 point",
        ));
    }
    VerifyingKey::from_sec1_bytes(&keypair.public_key)
        .map_err(|_| JwtError::invalid_key("Invalid SEC1 public key bytes"))?;

    let derived = signing_key.verifying_key().to_encoded_point(false);
    if derived.as_bytes() != keypair.public_key.as_slice() {
        return Err(JwtError::invalid_key(
            "Private scalar does not match public point",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_pairs_validate_and_differ() {
        let first = generate_es256_keypair().unwrap();
        let second = generate_es256_keypair().unwrap();

        assert!(validate_es256_keypair(&first).is_ok());
        assert!(validate_es256_keypair(&second).is_ok());
        assert_eq!(first.private_key.len(), 32);
        assert_eq!(first.public_key.len(), 65);
        assert_ne!(first.public_key, second.public_key);
    }

    #[test]
    fn mismatched_halves_are_rejected() {
        let first = generate_es256_keypair().unwrap();
        let second = generate_es256_keypair().unwrap();
        let spliced = Es256KeyPair {
            private_key: first.private_key.clone(),
            public_key: second.public_key.clone(),
        };

        assert!(matches!(
            validate_es256_keypair(&spliced),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn short_scalar_is_rejected() {
        let pair = Es256KeyPair {
            private_key: Zeroizing::new(vec![1u8; 31]),
            public_key: vec![4u8; 65],
        };
        assert!(validate_es256_keypair(&pair).is_err());
    }
}
