//! Service configuration: defaults, optional JSON file, environment overrides

use crate::error::ConfigError;
use keyrotor_key::RotationSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding `storage.directory`
pub const ENV_KEYS_DIR: &str = "KEYROTOR_KEYS_DIR";
/// Environment variable overriding `rotation.enabled`
pub const ENV_ROTATION_ENABLED: &str = "KEYROTOR_ROTATION_ENABLED";
/// Environment variable overriding `rotation.interval_minutes`
pub const ENV_ROTATION_INTERVAL: &str = "KEYROTOR_ROTATION_INTERVAL_MINUTES";
/// Environment variable overriding `rotation.initial_delay_minutes`
pub const ENV_ROTATION_INITIAL_DELAY: &str = "KEYROTOR_ROTATION_INITIAL_DELAY_MINUTES";
/// Environment variable overriding `token.expiry_minutes`
pub const ENV_TOKEN_EXPIRY: &str = "KEYROTOR_TOKEN_EXPIRY_MINUTES";
/// Environment variable overriding `logging.level`
pub const ENV_LOG: &str = "KEYROTOR_LOG";

/// Longest accepted token lifetime: one year
const MAX_EXPIRY_MINUTES: i64 = 60 * 24 * 366;

/// Complete service configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Key directory
    #[serde(default)]
    pub storage: StorageConfig,
    /// Rotation schedule
    #[serde(default)]
    pub rotation: RotationConfig,
    /// Token lifetime and issuer
    #[serde(default)]
    pub token: TokenConfig,
    /// Default log filter
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the key files live
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Holds `primary.jwk` and `secondary.jwk`; created owner-only if missing
    #[serde(default = "default_keys_dir")]
    pub directory: PathBuf,
}

/// Scheduled rotation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Run the scheduled rotation task
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minutes between the end of one rotation and the next
    #[serde(default = "default_rotation_minutes")]
    pub interval_minutes: u64,
    /// Minutes before the first scheduled rotation
    #[serde(default = "default_rotation_minutes")]
    pub initial_delay_minutes: u64,
}

/// Issued tokens
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Minutes from issuance to `exp`
    #[serde(default = "default_expiry_minutes")]
    pub expiry_minutes: u64,
    /// `iss` claim, omitted when unset
    #[serde(default)]
    pub issuer: Option<String>,
}

/// Log filter used when `RUST_LOG` is unset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, such as `info` or `keyrotor=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_keys_dir() -> PathBuf {
    PathBuf::from("./keys")
}

fn default_true() -> bool {
    true
}

fn default_rotation_minutes() -> u64 {
    20
}

fn default_expiry_minutes() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: default_keys_dir(),
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_minutes: default_rotation_minutes(),
            initial_delay_minutes: default_rotation_minutes(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            expiry_minutes: default_expiry_minutes(),
            issuer: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ServiceConfig {
    /// Defaults, then `path` if given, then the process environment.
    /// The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply `KEYROTOR_*` overrides looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_KEYS_DIR) {
            self.storage.directory = PathBuf::from(dir);
        }
        if let Some(value) = lookup(ENV_ROTATION_ENABLED) {
            self.rotation.enabled = parse_bool(ENV_ROTATION_ENABLED, value)?;
        }
        if let Some(value) = lookup(ENV_ROTATION_INTERVAL) {
            self.rotation.interval_minutes = parse_minutes(ENV_ROTATION_INTERVAL, value)?;
        }
        if let Some(value) = lookup(ENV_ROTATION_INITIAL_DELAY) {
            self.rotation.initial_delay_minutes =
                parse_minutes(ENV_ROTATION_INITIAL_DELAY, value)?;
        }
        if let Some(value) = lookup(ENV_TOKEN_EXPIRY) {
            self.token.expiry_minutes = parse_minutes(ENV_TOKEN_EXPIRY, value)?;
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rotation.interval_minutes == 0 {
            return Err(ConfigError::Invalid(
                "rotation.interval_minutes must be greater than zero".to_string(),
            ));
        }
        if self.token.expiry_minutes == 0 {
            return Err(ConfigError::Invalid(
                "token.expiry_minutes must be greater than zero".to_string(),
            ));
        }
        if i64::try_from(self.token.expiry_minutes).map_or(true, |m| m > MAX_EXPIRY_MINUTES) {
            return Err(ConfigError::Invalid(format!(
                "token.expiry_minutes must be at most {MAX_EXPIRY_MINUTES}"
            )));
        }
        if self.storage.directory.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Scheduler settings in wall-clock units
    #[must_use]
    pub fn rotation_settings(&self) -> RotationSettings {
        RotationSettings {
            enabled: self.rotation.enabled,
            interval: minutes(self.rotation.interval_minutes),
            initial_delay: minutes(self.rotation.initial_delay_minutes),
        }
    }

    /// Lifetime of issued tokens
    #[must_use]
    pub fn token_lifetime(&self) -> chrono::Duration {
        let minutes = i64::try_from(self.token.expiry_minutes)
            .map_or(MAX_EXPIRY_MINUTES, |m| m.min(MAX_EXPIRY_MINUTES));
        chrono::Duration::minutes(minutes)
    }
}

fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(60))
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv { name, value }),
    }
}

fn parse_minutes(name: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.storage.directory, PathBuf::from("./keys"));
        assert!(config.rotation.enabled);
        assert_eq!(config.rotation.interval_minutes, 20);
        assert_eq!(config.rotation.initial_delay_minutes, 20);
        assert_eq!(config.token.expiry_minutes, 10);
        assert_eq!(config.token.issuer, None);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyrotor.json");
        std::fs::write(
            &path,
            r#"{"rotation": {"interval_minutes": 5}, "token": {"issuer": "auth.internal"}}"#,
        )
        .unwrap();

        let config = ServiceConfig::from_file(&path).unwrap();

        assert_eq!(config.rotation.interval_minutes, 5);
        assert_eq!(config.rotation.initial_delay_minutes, 20);
        assert!(config.rotation.enabled);
        assert_eq!(config.token.issuer.as_deref(), Some("auth.internal"));
        assert_eq!(config.token.expiry_minutes, 10);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = ServiceConfig::default();
        config
            .apply_env(env(&[
                (ENV_KEYS_DIR, "/var/lib/keyrotor"),
                (ENV_ROTATION_ENABLED, "false"),
                (ENV_ROTATION_INTERVAL, "60"),
                (ENV_TOKEN_EXPIRY, " 15 "),
                (ENV_LOG, "debug"),
            ]))
            .unwrap();

        assert_eq!(config.storage.directory, PathBuf::from("/var/lib/keyrotor"));
        assert!(!config.rotation.enabled);
        assert_eq!(config.rotation_settings().interval, Duration::from_secs(3600));
        assert_eq!(config.token_lifetime(), chrono::Duration::minutes(15));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn bad_environment_values_are_reported() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_env(env(&[(ENV_ROTATION_ENABLED, "maybe")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                name: ENV_ROTATION_ENABLED,
                ..
            }
        ));

        assert!(config
            .apply_env(env(&[(ENV_ROTATION_INTERVAL, "-3")]))
            .is_err());
    }

    #[test]
    fn zero_interval_or_expiry_is_rejected() {
        let mut config = ServiceConfig::default();
        config.rotation.interval_minutes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ServiceConfig::default();
        config.token.expiry_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unreadable_or_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ServiceConfig::from_file(&dir.path().join("absent.json")),
            Err(ConfigError::Read { .. })
        ));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ rotation").unwrap();
        assert!(matches!(
            ServiceConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
