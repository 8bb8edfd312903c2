use std::path::PathBuf;

use chrono::{DateTime, Duration, Local, Utc};
use coolwatch_common::types::Sample;
use serde::{Deserialize, Serialize};

use crate::window::RollingWindow;

/// Errors from the persisted state store.
///
/// Only an unreadable state file is fatal. A file that can be read but not
/// parsed degrades to default state with a warning, and write failures are
/// logged and swallowed.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to read state file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The notifier's cross-invocation memory.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifierState {
    /// When the last notification actually fired; cleared by the daily reset
    /// and by a fresh rapid-change event.
    pub last_notification_time: Option<DateTime<Utc>>,
    /// When the last rapid-change event was recorded.
    pub last_significant_rise_time: Option<DateTime<Utc>>,
    /// One-way latch (until the daily reset) gating the final comparison.
    pub armed: bool,
    pub window: RollingWindow,
    /// Outdoor temperatures observed since the last notification, one per
    /// invocation; cleared exactly when a notification fires.
    pub temps_since_last_notification: Vec<f64>,
}

impl NotifierState {
    pub fn new(window_minutes: u32) -> Self {
        Self {
            last_notification_time: None,
            last_significant_rise_time: None,
            armed: false,
            window: RollingWindow::new(window_minutes),
            temps_since_last_notification: Vec::new(),
        }
    }

    /// True iff a notification was sent on an earlier local calendar day.
    pub fn is_new_day(&self, now: DateTime<Utc>) -> bool {
        match self.last_notification_time {
            Some(last) => {
                last.with_timezone(&Local).date_naive() != now.with_timezone(&Local).date_naive()
            }
            None => false,
        }
    }

    /// True while the cooldown period after the last notification is still
    /// running. Always false when no notification has been sent.
    pub fn is_in_cooldown(&self, now: DateTime<Utc>, cooldown_minutes: u32) -> bool {
        let Some(last) = self.last_notification_time else {
            return false;
        };
        let elapsed = now - last;
        if elapsed < Duration::minutes(i64::from(cooldown_minutes)) {
            tracing::debug!(
                elapsed_minutes = elapsed.num_minutes(),
                cooldown_minutes,
                "Last notification is within the cooldown period"
            );
            true
        } else {
            false
        }
    }

    /// Scans the temperatures observed since the last notification, left to
    /// right, tracking the running minimum; satisfied as soon as any value
    /// exceeds that minimum by at least `min_rise`. Fewer than two entries
    /// never satisfy the requirement.
    pub fn has_min_rise_since_last_notification(&self, min_rise: f64) -> bool {
        let temps = &self.temps_since_last_notification;
        if temps.len() < 2 {
            return false;
        }

        let mut min_seen = temps[0];
        for &temp in &temps[1..] {
            if temp - min_seen >= min_rise {
                tracing::debug!(
                    rise = temp - min_seen,
                    min_rise,
                    "Detected sufficient temperature rise since last notification"
                );
                return true;
            }
            min_seen = min_seen.min(temp);
        }
        false
    }

    /// Whether the last recorded rapid-change event still falls within the
    /// rolling window's span.
    pub fn is_last_rapid_change_within_window(&self) -> bool {
        match self.last_significant_rise_time {
            Some(time) => self.window.is_within_window(time),
            None => {
                tracing::debug!("No previous rapid-change event recorded");
                false
            }
        }
    }
}

/// Persisted wire format: field names and shapes are stable so state files
/// round-trip across runs. Each field falls back to its default when missing,
/// tolerating records written by older versions.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateRecord {
    #[serde(default)]
    last_notification_time: Option<DateTime<Utc>>,
    #[serde(default)]
    last_significant_rise_time: Option<DateTime<Utc>>,
    #[serde(default)]
    armed: bool,
    #[serde(default)]
    rolling_window: Vec<Sample>,
    #[serde(default)]
    temps_since_last_notification: Vec<f64>,
}

/// Loads and saves [`NotifierState`] as a JSON file.
pub struct StateStore {
    path: PathBuf,
    window_minutes: u32,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>, window_minutes: u32) -> Self {
        Self {
            path: path.into(),
            window_minutes,
        }
    }

    /// Reads the state file, falling back to defaults when the file is
    /// missing or unparseable. An I/O failure on an existing file is fatal.
    pub fn load(&self) -> Result<NotifierState, StateError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No state file, starting from defaults");
            return Ok(NotifierState::new(self.window_minutes));
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| StateError::Read {
            path: self.path.clone(),
            source,
        })?;

        let record: StateRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to parse state file, falling back to defaults"
                );
                return Ok(NotifierState::new(self.window_minutes));
            }
        };

        Ok(NotifierState {
            last_notification_time: record.last_notification_time,
            last_significant_rise_time: record.last_significant_rise_time,
            armed: record.armed,
            window: RollingWindow::from_samples(self.window_minutes, record.rolling_window),
            temps_since_last_notification: record.temps_since_last_notification,
        })
    }

    /// Best-effort atomic write: serialize, write to a sibling temp file,
    /// rename over the target. Failures are logged, never propagated.
    pub fn save(&self, state: &NotifierState) {
        let record = StateRecord {
            last_notification_time: state.last_notification_time,
            last_significant_rise_time: state.last_significant_rise_time,
            armed: state.armed,
            rolling_window: state.window.samples().iter().copied().collect(),
            temps_since_last_notification: state.temps_since_last_notification.clone(),
        };

        let json = match serde_json::to_string_pretty(&record) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize state");
                return;
            }
        };

        let tmp = self.path.with_extension("tmp");
        let result = std::fs::write(&tmp, json).and_then(|()| std::fs::rename(&tmp, &self.path));
        match result {
            Ok(()) => tracing::debug!(path = %self.path.display(), "State saved"),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to write state file"
            ),
        }
    }
}
