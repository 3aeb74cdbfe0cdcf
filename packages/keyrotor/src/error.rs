//! Service-level errors

use keyrotor_jwt::JwtError;
use keyrotor_key::{InitError, KeyError, RotationError};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration could not be loaded or is out of range
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Cannot read config file {}: {source}", .path.display())]
    Read {
        /// Config file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`crate::ServiceConfig`]
    #[error("Cannot parse config file {}: {source}", .path.display())]
    Parse {
        /// Config file
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// An environment override has an unusable value
    #[error("Invalid value {value:?} for {name}")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Value found
        value: String,
    },

    /// A setting is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Token issuance failed
#[derive(Debug, Error)]
pub enum SigningError {
    /// The request is missing a required field
    #[error("Invalid token request: {0}")]
    InvalidRequest(String),

    /// The current key could not sign
    #[error("Signing failed: {0}")]
    Jose(#[from] JwtError),
}

/// Any failure surfaced by the service or its CLI
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Keys could not be initialized; the service must not start
    #[error(transparent)]
    Init(#[from] InitError),

    /// Key store problem outside initialization
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A rotation failed
    #[error(transparent)]
    Rotation(#[from] RotationError),

    /// Token issuance failed
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// A write was requested from a service opened without the writer lock
    #[error("Key directory {} is open read-only; rotate from the serving process", .path.display())]
    ReadOnly {
        /// Key directory
        path: PathBuf,
    },

    /// Output could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Runtime I/O, such as waiting for a shutdown signal
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
