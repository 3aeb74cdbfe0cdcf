//! Structured logging bootstrap and log-safe identifiers

use sha2::{Digest, Sha256};
use std::sync::Once;
use tracing::info;
use tracing_subscriber::EnvFilter;

static INIT_LOGGER: Once = Once::new();

/// Install the global `tracing` subscriber. Later calls are no-ops.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` (for example
/// `info` or `keyrotor_key=debug,info`) is used.
pub fn init(default_level: &str) {
    INIT_LOGGER.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok()
        {
            info!("Structured logging initialized");
        }
    });
}

/// Short SHA-256 fingerprint of `value`, for correlating log lines without
/// recording the value itself.
#[must_use]
pub fn secure_hash(value: &str) -> String {
    let hash = Sha256::digest(value.as_bytes());
    let hex_hash = format!("{hash:x}");
    format!("#{}", &hex_hash[..12])
}
