//! Rotation status reporting

use chrono::{DateTime, Utc};
use keyrotor_key::{RotationMetadata, RotationStats};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rotation status as shown to operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationStatus {
    /// Whether scheduled rotation runs in this process
    pub enabled: bool,
    /// Successful rotations since this process started
    pub total_rotations: u64,
    /// Last successful rotation in this process
    pub last_rotation: Option<DateTime<Utc>>,
    /// Time until the next scheduled rotation, rendered with [`format_duration`]
    pub next_rotation_in: String,
    /// Time until the next scheduled rotation in whole minutes
    pub next_rotation_minutes: u64,
    /// Scheduled rotation interval in whole minutes
    pub interval_minutes: u64,
    /// Key ID new tokens are signed with
    pub primary_key_id: String,
    /// Key ID that remains valid for verification
    pub secondary_key_id: String,
    /// When the key directory was last written, by any process
    pub last_persisted_at: Option<DateTime<Utc>>,
    /// Primary key ID recorded on disk
    pub persisted_primary_key_id: Option<String>,
    /// Secondary key ID recorded on disk
    pub persisted_secondary_key_id: Option<String>,
}

impl RotationStatus {
    /// Status from scheduler stats and the active key IDs
    #[must_use]
    pub fn new(stats: &RotationStats, primary_key_id: &str, secondary_key_id: &str) -> Self {
        Self {
            enabled: stats.enabled,
            total_rotations: stats.total_rotations,
            last_rotation: stats.last_rotation,
            next_rotation_in: format_duration(stats.time_until_next),
            next_rotation_minutes: stats.time_until_next.as_secs() / 60,
            interval_minutes: stats.interval.as_secs() / 60,
            primary_key_id: primary_key_id.to_string(),
            secondary_key_id: secondary_key_id.to_string(),
            last_persisted_at: None,
            persisted_primary_key_id: None,
            persisted_secondary_key_id: None,
        }
    }

    /// Add the rotation record last written to the key directory.
    #[must_use]
    pub fn with_persisted(mut self, metadata: Option<&RotationMetadata>) -> Self {
        if let Some(metadata) = metadata {
            self.last_persisted_at = Some(metadata.updated_at);
            self.persisted_primary_key_id = Some(metadata.primary_kid.clone());
            self.persisted_secondary_key_id = Some(metadata.secondary_kid.clone());
        }
        self
    }
}

/// Response to a manual rotation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualRotationResponse {
    /// Whether the rotation was persisted and published
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// When the response was produced
    pub timestamp: DateTime<Utc>,
}

impl ManualRotationResponse {
    /// Response for a rotation that did or did not succeed
    #[must_use]
    pub fn from_outcome(success: bool) -> Self {
        let message = if success {
            "Key rotation completed successfully"
        } else {
            "Key rotation failed"
        };
        Self {
            success,
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// `1h 2m 3s`, `2m 3s` or `3s`; leading zero units are dropped.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_render_with_leading_units_dropped() {
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h 2m 3s");
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h 0m 0s");
        assert_eq!(format_duration(Duration::from_secs(123)), "2m 3s");
        assert_eq!(format_duration(Duration::from_secs(3)), "3s");
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_millis(1999)), "1s");
    }

    #[test]
    fn status_serializes_camel_case() {
        let stats = RotationStats {
            total_rotations: 4,
            last_rotation: None,
            time_until_next: Duration::from_secs(125),
            enabled: true,
            interval: Duration::from_secs(1200),
        };
        let value = serde_json::to_value(RotationStatus::new(&stats, "d-key-a", "d-key-b")).unwrap();

        assert_eq!(value["totalRotations"], 4);
        assert_eq!(value["nextRotationIn"], "2m 5s");
        assert_eq!(value["nextRotationMinutes"], 2);
        assert_eq!(value["intervalMinutes"], 20);
        assert_eq!(value["primaryKeyId"], "d-key-a");
        assert!(value["lastRotation"].is_null());
        assert!(value["lastPersistedAt"].is_null());
    }

    #[test]
    fn next_rotation_minutes_truncate() {
        let mut stats = RotationStats {
            total_rotations: 0,
            last_rotation: None,
            time_until_next: Duration::from_secs(59),
            enabled: true,
            interval: Duration::from_secs(1200),
        };
        assert_eq!(RotationStatus::new(&stats, "a", "b").next_rotation_minutes, 0);

        stats.time_until_next = Duration::from_secs(1199);
        assert_eq!(RotationStatus::new(&stats, "a", "b").next_rotation_minutes, 19);
    }

    #[test]
    fn persisted_record_fills_disk_fields() {
        let stats = RotationStats {
            total_rotations: 0,
            last_rotation: None,
            time_until_next: Duration::ZERO,
            enabled: false,
            interval: Duration::from_secs(1200),
        };
        let written = Utc::now();
        let metadata = RotationMetadata {
            primary_kid: "d-key-new".to_string(),
            secondary_kid: "d-key-old".to_string(),
            updated_at: written,
        };

        let status = RotationStatus::new(&stats, "d-key-a", "d-key-b").with_persisted(Some(&metadata));
        assert_eq!(status.last_persisted_at, Some(written));
        assert_eq!(status.persisted_primary_key_id.as_deref(), Some("d-key-new"));
        assert_eq!(status.persisted_secondary_key_id.as_deref(), Some("d-key-old"));
        assert_eq!(status.primary_key_id, "d-key-a");

        let unrecorded = RotationStatus::new(&stats, "d-key-a", "d-key-b").with_persisted(None);
        assert_eq!(unrecorded.last_persisted_at, None);
    }

    #[test]
    fn manual_response_reports_outcome() {
        assert!(ManualRotationResponse::from_outcome(true).success);
        let failed = ManualRotationResponse::from_outcome(false);
        assert!(!failed.success);
        assert_eq!(failed.message, "Key rotation failed");
    }
}
