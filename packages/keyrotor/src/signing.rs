//! Token issuance and validation against the current key pair

use crate::error::SigningError;
use crate::logging::secure_hash;
use chrono::{DateTime, Duration, Utc};
use keyrotor_jwt::{
    Jose, JwtClaims, ValidationOptions, ES256, decode_claims_unverified, decode_header,
};
use keyrotor_key::{KeyLifecycleManager, SigningKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// `tokenType` of every issued token
pub const TOKEN_TYPE: &str = "Bearer";

/// What a caller asks a token for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Calling service
    pub sub: String,
    /// Service the token is for
    pub aud: String,
    /// Granted scope identifiers
    #[serde(default)]
    pub scp: Vec<i64>,
}

impl TokenRequest {
    /// Reject blank subject or audience.
    pub fn validate(&self) -> Result<(), SigningError> {
        if self.sub.trim().is_empty() {
            return Err(SigningError::InvalidRequest(
                "sub must not be blank".to_string(),
            ));
        }
        if self.aud.trim().is_empty() {
            return Err(SigningError::InvalidRequest(
                "aud must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

/// Token response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    /// Compact JWS
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Seconds until expiry
    pub expires_in: i64,
}

/// Why a token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// Not a decodable ES256 compact JWS
    Malformed,
    /// The `kid` is neither the primary nor the secondary key
    UnknownKey,
    /// No active key verifies the signature
    BadSignature,
    /// `exp` has passed
    Expired,
    /// `iss` differs from the expected issuer
    WrongIssuer,
    /// `aud` differs from the expected audience
    WrongAudience,
}

/// Outcome of validating a token. Rejection is an ordinary value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    /// Signed by an active key and within policy
    Valid {
        /// Key that verified the signature
        key_id: String,
        /// Verified claims
        claims: JwtClaims,
    },
    /// Rejected
    Invalid {
        /// Why
        reason: InvalidReason,
    },
}

impl Verification {
    /// Whether the token was accepted
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid { .. })
    }

    fn invalid(reason: InvalidReason) -> Self {
        Verification::Invalid { reason }
    }
}

/// Signs tokens with the current primary key and validates them against
/// both active keys.
#[derive(Clone)]
pub struct TokenIssuer {
    manager: Arc<KeyLifecycleManager>,
    jose: Arc<dyn Jose>,
    lifetime: Duration,
    issuer: Option<String>,
}

impl TokenIssuer {
    /// New issuer producing tokens that live for `lifetime`
    pub fn new(
        manager: Arc<KeyLifecycleManager>,
        jose: Arc<dyn Jose>,
        lifetime: Duration,
        issuer: Option<String>,
    ) -> Self {
        Self {
            manager,
            jose,
            lifetime,
            issuer,
        }
    }

    /// Issue a token valid from now.
    pub fn issue(&self, request: &TokenRequest) -> Result<IssuedToken, SigningError> {
        self.issue_at(request, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        request: &TokenRequest,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, SigningError> {
        request.validate()?;

        let key = self.manager.current_signing_key();
        let issued_at = now.timestamp();
        let expires_at = issued_at + self.lifetime.num_seconds();

        let mut claims = JwtClaims::new()
            .with_subject(request.sub.as_str())
            .with_audience(request.aud.as_str())
            .with_scopes(request.scp.clone())
            .with_lifetime(issued_at, expires_at)
            .with_jwt_id(Uuid::new_v4().to_string());
        if let Some(issuer) = &self.issuer {
            claims = claims.with_issuer(issuer.as_str());
        }

        let access_token = self.jose.sign(&claims, key.key_id(), key.keypair())?;
        debug!(
            subject = %secure_hash(&request.sub),
            kid = key.key_id(),
            "Issued token"
        );

        Ok(IssuedToken {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.lifetime.num_seconds(),
        })
    }

    /// Validate with expiry checking and the configured issuer.
    #[must_use]
    pub fn validate(&self, token: &str) -> Verification {
        let mut options = ValidationOptions::default();
        if let Some(issuer) = &self.issuer {
            options = options.with_issuer(issuer.as_str());
        }
        self.validate_with(token, &options, Utc::now())
    }

    /// Validate against the active pair under `options` at time `now`.
    ///
    /// The key is picked by the header `kid`; a token without one is tried
    /// against the primary and then the secondary key.
    #[must_use]
    pub fn validate_with(
        &self,
        token: &str,
        options: &ValidationOptions,
        now: DateTime<Utc>,
    ) -> Verification {
        let (header, claims) = match (decode_header(token), decode_claims_unverified(token)) {
            (Ok(header), Ok(claims)) if header.alg == ES256 => (header, claims),
            _ => return Verification::invalid(InvalidReason::Malformed),
        };

        let pair = self.manager.all_verification_keys();
        let candidates: Vec<&Arc<SigningKey>> = match header.kid.as_deref() {
            Some(kid) => match pair.find(kid) {
                Some(key) => vec![key],
                None => {
                    debug!(kid, "Token signed by a key that is no longer active");
                    return Verification::invalid(InvalidReason::UnknownKey);
                }
            },
            None => pair.keys().to_vec(),
        };

        let Some(key) = candidates
            .into_iter()
            .find(|key| self.jose.verify(token, key.public_key()))
        else {
            return Verification::invalid(InvalidReason::BadSignature);
        };

        if options.validate_exp
            && claims.is_expired_at(now.timestamp(), options.leeway.num_seconds())
        {
            return Verification::invalid(InvalidReason::Expired);
        }
        if let Some(expected) = &options.expected_issuer {
            if claims.iss.as_deref() != Some(expected.as_str()) {
                return Verification::invalid(InvalidReason::WrongIssuer);
            }
        }
        if let Some(expected) = &options.expected_audience {
            if claims.aud.as_deref() != Some(expected.as_str()) {
                return Verification::invalid(InvalidReason::WrongAudience);
            }
        }

        Verification::Valid {
            key_id: key.key_id().to_string(),
            claims,
        }
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("alg", &self.jose.alg())
            .field("lifetime_secs", &self.lifetime.num_seconds())
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}
