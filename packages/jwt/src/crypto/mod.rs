//! ES256 cryptographic operations

pub mod es256_keys;
pub mod es256_signing;
pub mod es256_verification;

pub use es256_keys::es256_generate_keys;
pub use es256_signing::es256_sign;
pub use es256_verification::es256_verify;
