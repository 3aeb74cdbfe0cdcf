//! ES256 JSON Web Token primitives for rotating signing keys
//!
//! This crate provides:
//! - P-256 key generation and key-pair validation
//! - Compact JWS signing and verification (ES256, fixed-width `r || s`)
//! - EC JWK documents and JWK sets for persistence and publication
//! - The [`Jose`] capability trait the key lifecycle is written against

pub(crate) mod algorithms;
pub mod compact;
pub(crate) mod crypto;
mod error;
pub mod jose;
pub mod jwk;
mod traits;
mod types;
pub mod validation;

pub use algorithms::{generate_es256_keypair, validate_es256_keypair};
pub use compact::{decode_claims_unverified, decode_header};
pub use error::*;
pub use jose::Es256Jose;
pub use jwk::{EcJwk, JwkSet};
pub use traits::Jose;
pub use types::*;
pub use validation::ValidationOptions;
