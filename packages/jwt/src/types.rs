//! JWT type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use zeroize::Zeroizing;

/// JWS algorithm name for ECDSA P-256 with SHA-256.
pub const ES256: &str = "ES256";

/// Elliptic curves the capability can generate keys for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256 (secp256r1)
    P256,
}

impl Curve {
    /// JWK `crv` name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Subject: the calling service
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Audience
    pub aud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Scope identifiers
    pub scp: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Expiry, unix seconds
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Issued at, unix seconds
    pub iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Issuer
    pub iss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Token ID
    pub jti: Option<String>,

    /// Custom claims, flattened into the root object
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl JwtClaims {
    /// Empty claim set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subject
    #[must_use]
    pub fn with_subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Set the audience
    #[must_use]
    pub fn with_audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Some(aud.into());
        self
    }

    /// Set the scopes
    #[must_use]
    pub fn with_scopes(mut self, scp: Vec<i64>) -> Self {
        self.scp = Some(scp);
        self
    }

    /// Set issued-at and expiry from unix seconds
    #[must_use]
    pub fn with_lifetime(mut self, issued_at: i64, expires_at: i64) -> Self {
        self.iat = Some(issued_at);
        self.exp = Some(expires_at);
        self
    }

    /// Set the issuer
    #[must_use]
    pub fn with_issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set the token ID
    #[must_use]
    pub fn with_jwt_id(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }

    /// True if `exp` is set and `now` (plus `leeway`) is at or past it.
    #[must_use]
    pub fn is_expired_at(&self, now: i64, leeway: i64) -> bool {
        self.exp.is_some_and(|exp| now >= exp.saturating_add(leeway))
    }
}

/// JWT header structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Signature algorithm
    pub alg: String,
    /// Media type, `JWT`
    pub typ: String,
    /// ID of the signing key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

impl JwtHeader {
    /// Header for the given algorithm with `typ: JWT`
    #[must_use]
    pub fn new(alg: &str) -> Self {
        Self {
            alg: alg.to_string(),
            typ: "JWT".to_string(),
            kid: None,
        }
    }

    /// Attach a key ID
    #[must_use]
    pub fn with_key_id(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }
}

/// Key pair for ES256.
///
/// `private_key` is the raw 32-byte scalar and is wiped on drop; `public_key`
/// is the 65-byte uncompressed SEC1 point (`0x04 || x || y`).
#[derive(Clone)]
pub struct Es256KeyPair {
    /// Private scalar
    pub private_key: Zeroizing<Vec<u8>>,
    /// Uncompressed public point
    pub public_key: Vec<u8>,
}

impl fmt::Debug for Es256KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Es256KeyPair")
            .field("private_key", &"[REDACTED]")
            .field("public_key_len", &self.public_key.len())
            .finish()
    }
}
