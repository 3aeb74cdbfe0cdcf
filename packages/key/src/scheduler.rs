//! Fixed-delay rotation scheduling and rotation statistics

use crate::error::RotationError;
use crate::lifecycle::KeyLifecycleManager;
use crate::signing_key::ActiveKeyPair;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(20 * 60);

/// When scheduled rotations happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSettings {
    /// Scheduled rotation on/off. Manual rotation is always available.
    pub enabled: bool,
    /// Delay between the end of one scheduled rotation and the next
    pub interval: Duration,
    /// Delay before the first scheduled rotation
    pub initial_delay: Duration,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: DEFAULT_INTERVAL,
            initial_delay: DEFAULT_INTERVAL,
        }
    }
}

/// Point-in-time view of the scheduler's counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationStats {
    /// Successful rotations since the scheduler was created
    pub total_rotations: u64,
    /// Completion time of the last successful rotation
    pub last_rotation: Option<DateTime<Utc>>,
    /// Time left before the next scheduled rotation, never negative
    pub time_until_next: Duration,
    /// Whether scheduled rotation is on
    pub enabled: bool,
    /// Configured interval
    pub interval: Duration,
}

/// What a scheduled tick did.
#[derive(Debug)]
pub enum ScheduledRotation {
    /// Scheduling is disabled; nothing happened
    Disabled,
    /// The pair was rotated
    Rotated(Arc<ActiveKeyPair>),
    /// Rotation failed; the previous pair is still active
    Failed(RotationError),
}

#[derive(Debug)]
struct Counters {
    total_rotations: u64,
    last_rotation: Option<DateTime<Utc>>,
    started_at: DateTime<Utc>,
}

/// Drives [`KeyLifecycleManager::rotate`] on a timer and on demand.
///
/// Mutual exclusion of rotations comes from the manager itself, so a manual
/// trigger issued while a scheduled rotation runs waits for it to finish and
/// then performs its own.
#[derive(Debug)]
pub struct RotationScheduler {
    manager: Arc<KeyLifecycleManager>,
    settings: RotationSettings,
    counters: Mutex<Counters>,
}

impl RotationScheduler {
    /// New scheduler; the timer is not running until [`RotationScheduler::spawn`].
    #[must_use]
    pub fn new(manager: Arc<KeyLifecycleManager>, settings: RotationSettings) -> Self {
        Self {
            manager,
            settings,
            counters: Mutex::new(Counters {
                total_rotations: 0,
                last_rotation: None,
                started_at: Utc::now(),
            }),
        }
    }

    /// The manager this scheduler rotates
    #[must_use]
    pub fn manager(&self) -> &Arc<KeyLifecycleManager> {
        &self.manager
    }

    /// Configured settings
    #[must_use]
    pub fn settings(&self) -> RotationSettings {
        self.settings
    }

    /// One timer tick. Failures are logged and left for the next tick.
    pub fn rotate_on_schedule(&self) -> ScheduledRotation {
        if !self.settings.enabled {
            debug!("Scheduled rotation is disabled; skipping");
            return ScheduledRotation::Disabled;
        }

        info!("Starting scheduled key rotation");
        match self.rotate_and_record() {
            Ok(pair) => ScheduledRotation::Rotated(pair),
            Err(e) => {
                warn!(error = %e, "Scheduled key rotation failed; retrying at the next interval");
                ScheduledRotation::Failed(e)
            }
        }
    }

    /// Rotate now, regardless of the schedule. Blocks while another rotation
    /// is in progress.
    pub fn trigger_manual_rotation(&self) -> bool {
        info!("Manual key rotation triggered");
        match self.rotate_and_record() {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Manual key rotation failed");
                false
            }
        }
    }

    /// Current statistics
    #[must_use]
    pub fn stats(&self) -> RotationStats {
        self.stats_at(Utc::now())
    }

    /// Statistics as of `now`.
    ///
    /// Before the first rotation the countdown runs from scheduler start
    /// against the initial delay; afterwards from the last rotation against
    /// the interval.
    #[must_use]
    pub fn stats_at(&self, now: DateTime<Utc>) -> RotationStats {
        let counters = self.counters();
        let (anchor, period) = match counters.last_rotation {
            Some(last) => (last, self.settings.interval),
            None => (counters.started_at, self.settings.initial_delay),
        };
        let elapsed = (now - anchor).to_std().unwrap_or(Duration::ZERO);

        RotationStats {
            total_rotations: counters.total_rotations,
            last_rotation: counters.last_rotation,
            time_until_next: period.saturating_sub(elapsed),
            enabled: self.settings.enabled,
            interval: self.settings.interval,
        }
    }

    /// Start the timer on the current tokio runtime.
    ///
    /// Waits the initial delay, then rotates and sleeps the interval in a
    /// loop. Rotations run on the blocking pool since they write files. The
    /// task stops when the returned handle is dropped.
    pub fn spawn(self: &Arc<Self>) -> RotationTask {
        self.counters().started_at = Utc::now();
        let scheduler = Arc::clone(self);
        let handle = tokio::spawn(async move { scheduler.run().await });
        RotationTask { handle }
    }

    async fn run(self: Arc<Self>) {
        if !self.settings.enabled {
            info!("Key rotation scheduling is disabled");
            return;
        }
        info!(
            initial_delay_secs = self.settings.initial_delay.as_secs(),
            interval_secs = self.settings.interval.as_secs(),
            "Key rotation scheduled"
        );

        tokio::time::sleep(self.settings.initial_delay).await;
        loop {
            let scheduler = Arc::clone(&self);
            if let Err(e) = tokio::task::spawn_blocking(move || scheduler.rotate_on_schedule()).await
            {
                error!(error = %e, "Scheduled rotation task panicked");
            }
            tokio::time::sleep(self.settings.interval).await;
        }
    }

    fn rotate_and_record(&self) -> Result<Arc<ActiveKeyPair>, RotationError> {
        let pair = self.manager.rotate()?;
        let mut counters = self.counters();
        counters.total_rotations += 1;
        counters.last_rotation = Some(Utc::now());
        Ok(pair)
    }

    fn counters(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to the running rotation timer; aborts it on drop.
#[derive(Debug)]
pub struct RotationTask {
    handle: JoinHandle<()>,
}

impl RotationTask {
    /// Stop the timer. A rotation already running on the blocking pool
    /// completes.
    pub fn stop(self) {
        drop(self);
    }

    /// Whether the timer has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RotationTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
