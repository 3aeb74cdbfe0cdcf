//! Compact JWS serialization helpers
//!
//! Splitting and base64url segment coding shared by signing, verification and
//! the unverified header/claims peeks used for key selection.

use crate::error::{JwtError, JwtResult};
use crate::types::{JwtClaims, JwtHeader};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, de::DeserializeOwned};

/// The three dot-separated segments of a compact JWS.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CompactParts<'a> {
    pub(crate) header: &'a str,
    pub(crate) claims: &'a str,
    pub(crate) signature: &'a str,
}

impl CompactParts<'_> {
    /// `header.claims`, the bytes covered by the signature
    pub(crate) fn signing_input(&self) -> String {
        let mut signing_input = String::with_capacity(self.header.len() + 1 + self.claims.len());
        signing_input.push_str(self.header);
        signing_input.push('.');
        signing_input.push_str(self.claims);
        signing_input
    }
}

pub(crate) fn split(token: &str) -> JwtResult<CompactParts<'_>> {
    let mut segments = token.split('.');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(header), Some(claims), Some(signature), None)
            if !header.is_empty() && !claims.is_empty() && !signature.is_empty() =>
        {
            Ok(CompactParts {
                header,
                claims,
                signature,
            })
        }
        _ => Err(JwtError::InvalidFormat),
    }
}

pub(crate) fn encode_segment<T: Serialize>(value: &T) -> JwtResult<String> {
    let json = serde_json::to_vec(value).map_err(|e| JwtError::serialization(&e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub(crate) fn decode_segment<T: DeserializeOwned>(segment: &str) -> JwtResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| JwtError::invalid_token("segment is not base64url"))?;
    serde_json::from_slice(&bytes).map_err(|e| JwtError::invalid_token(&e.to_string()))
}

/// Decode the header of a token without checking its signature.
///
/// Only safe for routing decisions such as picking a key by `kid`.
pub fn decode_header(token: &str) -> JwtResult<JwtHeader> {
    decode_segment(split(token)?.header)
}

/// Decode the claims of a token without checking its signature.
pub fn decode_claims_unverified(token: &str) -> JwtResult<JwtClaims> {
    decode_segment(split(token)?.claims)
}
