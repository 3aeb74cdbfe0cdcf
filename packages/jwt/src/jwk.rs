//! JSON Web Key documents for P-256 signing keys (RFC 7517 / RFC 7518 §6.2)

use crate::{
    algorithms::validate_es256_keypair,
    error::{JwtError, JwtResult},
    types::{Curve, ES256, Es256KeyPair},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use p256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

const KTY_EC: &str = "EC";
const USE_SIG: &str = "sig";

fn default_alg() -> String {
    ES256.to_string()
}

fn default_use() -> String {
    USE_SIG.to_string()
}

/// An EC JWK. Carries the private scalar `d` only in its persisted form;
/// [`EcJwk::to_public`] strips it for publication.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcJwk {
    /// Key type, `EC`
    pub kty: String,
    /// Curve, `P-256`
    pub crv: String,
    /// Algorithm, `ES256`
    #[serde(default = "default_alg")]
    pub alg: String,
    /// Intended use, `sig`
    #[serde(rename = "use", default = "default_use")]
    pub key_use: String,
    /// Key ID
    pub kid: String,
    /// Public point x coordinate, base64url
    pub x: String,
    /// Public point y coordinate, base64url
    pub y: String,
    /// Private scalar, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    /// Creation time, unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl EcJwk {
    /// Private JWK for `keypair` under `kid`.
    pub fn from_keypair(kid: &str, keypair: &Es256KeyPair, issued_at: Option<i64>) -> JwtResult<Self> {
        let (x, y) = split_point(&keypair.public_key)?;
        Ok(Self {
            kty: KTY_EC.to_string(),
            crv: Curve::P256.as_str().to_string(),
            alg: ES256.to_string(),
            key_use: USE_SIG.to_string(),
            kid: kid.to_string(),
            x: URL_SAFE_NO_PAD.encode(x),
            y: URL_SAFE_NO_PAD.encode(y),
            d: Some(URL_SAFE_NO_PAD.encode(keypair.private_key.as_slice())),
            iat: issued_at,
        })
    }

    /// Copy without private material
    #[must_use]
    pub fn to_public(&self) -> Self {
        Self {
            d: None,
            ..self.clone()
        }
    }

    /// Whether this document carries `d`
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// Uncompressed SEC1 public point from `x`/`y`, checked to lie on the curve.
    pub fn public_key_bytes(&self) -> JwtResult<Vec<u8>> {
        self.check_header_fields()?;

        let x = decode_coordinate(&self.x, "x")?;
        let y = decode_coordinate(&self.y, "y")?;

        let mut point = Vec::with_capacity(65);
        point.push(0x04);
        point.extend_from_slice(&x);
        point.extend_from_slice(&y);

        VerifyingKey::from_sec1_bytes(&point)
            .map_err(|_| JwtError::invalid_key("coordinates are not a point on P-256"))?;
        Ok(point)
    }

    /// Full key pair; requires `d` and checks it derives `(x, y)`.
    pub fn to_keypair(&self) -> JwtResult<Es256KeyPair> {
        let public_key = self.public_key_bytes()?;
        let d = self
            .d
            .as_deref()
            .ok_or_else(|| JwtError::invalid_key("JWK has no private scalar `d`"))?;
        let private_key = Zeroizing::new(decode_coordinate(d, "d")?);

        let keypair = Es256KeyPair {
            private_key,
            public_key,
        };
        validate_es256_keypair(&keypair)?;
        Ok(keypair)
    }

    fn check_header_fields(&self) -> JwtResult<()> {
        if self.kty != KTY_EC {
            return Err(JwtError::invalid_key(&format!(
                "expected kty EC, got {}",
                self.kty
            )));
        }
        if self.crv != Curve::P256.as_str() {
            return Err(JwtError::unsupported_algorithm(&self.crv));
        }
        if self.alg != ES256 {
            return Err(JwtError::unsupported_algorithm(&self.alg));
        }
        if self.kid.is_empty() {
            return Err(JwtError::invalid_key("JWK has an empty kid"));
        }
        Ok(())
    }
}

impl fmt::Debug for EcJwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcJwk")
            .field("kty", &self.kty)
            .field("crv", &self.crv)
            .field("alg", &self.alg)
            .field("use", &self.key_use)
            .field("kid", &self.kid)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("d", &self.d.as_ref().map(|_| "[REDACTED]"))
            .field("iat", &self.iat)
            .finish()
    }
}

/// A JWK set document: `{"keys": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    /// Keys, primary first
    pub keys: Vec<EcJwk>,
}

impl JwkSet {
    /// Find a key by `kid`
    #[must_use]
    pub fn find(&self, kid: &str) -> Option<&EcJwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }
}

fn split_point(public_key: &[u8]) -> JwtResult<(&[u8], &[u8])> {
    if public_key.len() != 65 || public_key[0] != 0x04 {
        return Err(JwtError::invalid_key(
            "Public key must be a 65-byte uncompressed P-256 point",
        ));
    }
    Ok((&public_key[1..33], &public_key[33..65]))
}

fn decode_coordinate(value: &str, name: &str) -> JwtResult<Vec<u8>> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|_| JwtError::invalid_key(&format!("`{name}` is not base64url")))?;
    if bytes.len() != 32 {
        return Err(JwtError::invalid_key(&format!(
            "`{name}` must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::generate_es256_keypair;

    #[test]
    fn private_document_reloads_to_same_pair() {
        let pair = generate_es256_keypair().unwrap();
        let jwk = EcJwk::from_keypair("d-key-1", &pair, Some(1_700_000_000)).unwrap();

        let json = serde_json::to_string(&jwk).unwrap();
        let parsed: EcJwk = serde_json::from_str(&json).unwrap();
        let reloaded = parsed.to_keypair().unwrap();

        assert_eq!(reloaded.public_key, pair.public_key);
        assert_eq!(reloaded.private_key.as_slice(), pair.private_key.as_slice());
    }

    #[test]
    fn public_form_has_no_d_field() {
        let pair = generate_es256_keypair().unwrap();
        let jwk = EcJwk::from_keypair("d-key-1", &pair, None).unwrap().to_public();

        let value = serde_json::to_value(&jwk).unwrap();
        assert!(value.get("d").is_none());
        assert_eq!(value["use"], "sig");
        assert_eq!(value["crv"], "P-256");
        assert!(jwk.to_keypair().is_err());
        assert_eq!(jwk.public_key_bytes().unwrap(), pair.public_key);
    }

    #[test]
    fn accepts_document_without_alg_and_use() {
        let pair = generate_es256_keypair().unwrap();
        let mut value =
            serde_json::to_value(EcJwk::from_keypair("k", &pair, None).unwrap()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("alg");
        object.remove("use");

        let parsed: EcJwk = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.alg, ES256);
        assert!(parsed.to_keypair().is_ok());
    }

    #[test]
    fn rejects_wrong_curve_and_bad_coordinates() {
        let pair = generate_es256_keypair().unwrap();
        let jwk = EcJwk::from_keypair("k", &pair, None).unwrap();

        let wrong_curve = EcJwk {
            crv: "P-384".to_string(),
            ..jwk.clone()
        };
        assert!(wrong_curve.to_keypair().is_err());

        let short_x = EcJwk {
            x: URL_SAFE_NO_PAD.encode([1u8; 16]),
            ..jwk.clone()
        };
        assert!(matches!(short_x.to_keypair(), Err(JwtError::InvalidKey(_))));

        let other = generate_es256_keypair().unwrap();
        let swapped_d = EcJwk {
            d: Some(URL_SAFE_NO_PAD.encode(other.private_key.as_slice())),
            ..jwk
        };
        assert!(swapped_d.to_keypair().is_err());
    }

    #[test]
    fn debug_output_redacts_private_scalar() {
        let pair = generate_es256_keypair().unwrap();
        let jwk = EcJwk::from_keypair("k", &pair, None).unwrap();
        let d = jwk.d.clone().unwrap();

        let rendered = format!("{jwk:?}");
        assert!(!rendered.contains(&d));
        assert!(rendered.contains("REDACTED"));
    }
}
