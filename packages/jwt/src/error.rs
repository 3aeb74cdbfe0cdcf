//! JWT error types

use thiserror::Error;

/// JWT operation result type
pub type JwtResult<T> = Result<T, JwtError>;

/// Errors raised by the ES256 JOSE capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    /// Token is not a three-segment compact JWS
    #[error("Invalid format")]
    InvalidFormat,
    /// A token segment could not be decoded
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    /// Signature bytes are malformed or do not verify
    #[error("Invalid JWT signature")]
    InvalidSignature,
    /// Key material is malformed or inconsistent
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),
    /// Unsupported algorithm or curve
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Signing failed
    #[error("Signing error: {0}")]
    SigningError(String),
}

impl JwtError {
    /// Create an invalid token error
    #[inline]
    #[must_use]
    pub fn invalid_token(msg: &str) -> Self {
        JwtError::InvalidToken(msg.to_string())
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: &str) -> Self {
        JwtError::InvalidKey(msg.to_string())
    }

    /// Create an unsupported algorithm error
    #[inline]
    #[must_use]
    pub fn unsupported_algorithm(alg: &str) -> Self {
        JwtError::UnsupportedAlgorithm(alg.to_string())
    }

    /// Create a serialization error
    #[inline]
    #[must_use]
    pub fn serialization(msg: &str) -> Self {
        JwtError::Serialization(msg.to_string())
    }

    /// Create a signing error
    #[inline]
    #[must_use]
    pub fn signing_error(msg: &str) -> Self {
        JwtError::SigningError(msg.to_string())
    }
}
