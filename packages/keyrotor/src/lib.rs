//! # keyrotor
//!
//! Issues short-lived ES256 tokens for other services, publishes the public
//! keys that verify them, and rotates its signing key on a schedule without
//! invalidating tokens signed just before a rotation.
//!
//! ```rust,no_run
//! use keyrotor::{KeyService, ServiceConfig, TokenRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = KeyService::bootstrap(ServiceConfig::default())?;
//! let issued = service.issuer().issue(&TokenRequest {
//!     sub: "billing".to_string(),
//!     aud: "ledger".to_string(),
//!     scp: vec![1],
//! })?;
//! assert!(service.issuer().validate(&issued.access_token).is_valid());
//! println!("{}", service.publisher().to_json()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod publication;
pub mod signing;
pub mod status;

pub use config::ServiceConfig;
pub use context::KeyService;
pub use error::{ConfigError, Result, ServiceError, SigningError};
pub use publication::KeySetPublisher;
pub use signing::{InvalidReason, IssuedToken, TokenIssuer, TokenRequest, Verification};
pub use status::{ManualRotationResponse, RotationStatus, format_duration};
