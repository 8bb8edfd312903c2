use chrono::{DateTime, Local, NaiveTime, Utc};
use coolwatch_common::types::Measurements;
use coolwatch_notify::error::NotifyError;
use coolwatch_notify::NotificationChannel;

use crate::settings::{AlertSettings, ArmingSettings};
use crate::state::{StateError, StateStore};
use crate::TemperatureSource;

/// Errors that abort an invocation of the decision engine.
///
/// State persisted before the failing step stays persisted; there is no
/// rollback. The next scheduled invocation retries from fresh inputs.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The temperature source could not be queried.
    #[error("data source query failed: {0}")]
    Source(#[source] anyhow::Error),

    /// A notification channel failed to deliver the alert.
    #[error("notifier '{channel}' failed: {source}")]
    Notifier {
        channel: String,
        #[source]
        source: NotifyError,
    },

    #[error(transparent)]
    State(#[from] StateError),
}

/// Why an invocation ended. One invocation produces exactly one outcome (or
/// an [`EngineError`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Indoor or outdoor reading was unavailable.
    MissingData,
    /// Indoor temperature is at or below the configured minimum.
    IndoorCoolEnough { indoor: f64 },
    /// A rapid-change event was detected but already notified within the
    /// current window span.
    RapidChangeSuppressed,
    /// Still inside the cooldown period after the last notification.
    Cooldown,
    /// No sufficient temperature rise since the last notification.
    InsufficientRise,
    /// The arming conditions have not been met today.
    NotArmed,
    /// All gates passed but it is not cooler outside.
    OutdoorNotCooler { indoor: f64, outdoor: f64 },
    /// A notification was dispatched to every configured channel.
    Notified { indoor: f64, outdoor: f64 },
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::MissingData => write!(f, "missing temperature data"),
            Outcome::IndoorCoolEnough { indoor } => {
                write!(f, "indoor temperature {indoor}°C is at or below the threshold")
            }
            Outcome::RapidChangeSuppressed => {
                write!(f, "rapid change event already notified within the window")
            }
            Outcome::Cooldown => write!(f, "notification is in the cooldown period"),
            Outcome::InsufficientRise => {
                write!(f, "no sufficient temperature rise since the last notification")
            }
            Outcome::NotArmed => write!(f, "notifier is not armed"),
            Outcome::OutdoorNotCooler { indoor, outdoor } => {
                write!(f, "outdoor {outdoor}°C is not below indoor {indoor}°C")
            }
            Outcome::Notified { indoor, outdoor } => {
                write!(f, "notified: outdoor {outdoor}°C < indoor {indoor}°C")
            }
        }
    }
}

/// The per-invocation decision algorithm.
///
/// Gates run in a fixed order; each may short-circuit the rest. State is
/// saved after every semantically meaningful mutation, so a crash
/// mid-invocation preserves whatever already completed.
pub struct DecisionEngine<'a> {
    settings: &'a AlertSettings,
    store: &'a StateStore,
    channels: &'a [Box<dyn NotificationChannel>],
}

impl<'a> DecisionEngine<'a> {
    pub fn new(
        settings: &'a AlertSettings,
        store: &'a StateStore,
        channels: &'a [Box<dyn NotificationChannel>],
    ) -> Self {
        Self {
            settings,
            store,
            channels,
        }
    }

    pub async fn run(
        &self,
        source: &dyn TemperatureSource,
        measurements: &Measurements,
        now: DateTime<Utc>,
    ) -> Result<Outcome, EngineError> {
        let mut state = self.store.load()?;

        // 1. Daily reset
        if state.is_new_day(now) {
            tracing::info!("New day detected, resetting notification time and arming");
            state.last_notification_time = None;
            state.armed = false;
            self.store.save(&state);
        }

        // 2. Acquire samples
        let indoor = source
            .last_value(&measurements.indoor)
            .await
            .map_err(EngineError::Source)?;
        let outdoor = source
            .last_value(&measurements.outdoor)
            .await
            .map_err(EngineError::Source)?;
        let (Some(indoor), Some(outdoor)) = (indoor, outdoor) else {
            tracing::warn!(?indoor, ?outdoor, "Missing temperature data");
            return Ok(Outcome::MissingData);
        };
        tracing::info!(indoor, outdoor, "Current temperatures");

        // 3. Update window
        state.window.append(now, outdoor);
        state.temps_since_last_notification.push(outdoor);
        self.store.save(&state);

        // 4. Indoor threshold gate (inclusive: exactly at the threshold
        //    counts as cool enough)
        let min_indoor = self.settings.notification.min_indoor_temperature;
        if indoor <= min_indoor {
            tracing::info!(
                indoor,
                threshold = min_indoor,
                "Indoor temperature at or below threshold, no notification needed"
            );
            return Ok(Outcome::IndoorCoolEnough { indoor });
        }

        // 5. Arming evaluation
        if state.armed {
            tracing::debug!("Notifier is already armed");
        } else {
            let time_of_day = now.with_timezone(&Local).time();
            if should_arm(&self.settings.arming, indoor, outdoor, time_of_day) {
                state.armed = true;
                self.store.save(&state);
            }
        }

        // 6. Rapid-change gate
        let rapid = &self.settings.notification.rapid_change_event;
        if state
            .window
            .has_significant_rise_and_drop(rapid.rise, rapid.drop)
        {
            if state.is_last_rapid_change_within_window() {
                tracing::info!(
                    "Rapid change event already notified and still within the rolling window"
                );
                return Ok(Outcome::RapidChangeSuppressed);
            }
            tracing::info!("Rapid change event detected, resetting last notification time");
            state.last_significant_rise_time = Some(now);
            state.last_notification_time = None;
            self.store.save(&state);
        }

        // 7. Cooldown and re-enable gate. A rapid-change event in step 6
        //    clears last_notification_time, skipping these checks entirely.
        if state.last_notification_time.is_some() {
            let reenable = &self.settings.notification.reenable;
            if state.is_in_cooldown(now, reenable.cooldown_minutes) {
                tracing::info!("Notification is in the cooldown period");
                return Ok(Outcome::Cooldown);
            }
            if !state.has_min_rise_since_last_notification(reenable.min_rise_between_notifications)
            {
                tracing::info!(
                    min_rise = reenable.min_rise_between_notifications,
                    "No sufficient temperature rise since the last notification"
                );
                return Ok(Outcome::InsufficientRise);
            }
        } else {
            tracing::debug!("No notification sent today, skipping cooldown and rise checks");
        }

        // 8. Armed gate
        if !state.armed {
            tracing::info!("Notifier is not armed, no notification sent");
            return Ok(Outcome::NotArmed);
        }

        // 9. Final comparison and dispatch
        if outdoor >= indoor {
            tracing::info!(
                indoor,
                outdoor,
                "Outdoor temperature is not below indoor temperature"
            );
            return Ok(Outcome::OutdoorNotCooler { indoor, outdoor });
        }

        let message = format!(
            "Outdoor temperature is lower than indoor temperature: \
             {outdoor:.1}°C < {indoor:.1}°C"
        );
        for channel in self.channels {
            channel
                .send("Temperature Alert", &message)
                .await
                .map_err(|source| EngineError::Notifier {
                    channel: channel.channel_name().to_string(),
                    source,
                })?;
            tracing::info!(channel = channel.channel_name(), "Notification dispatched");
        }

        state.last_notification_time = Some(now);
        state.temps_since_last_notification.clear();
        self.store.save(&state);
        Ok(Outcome::Notified { indoor, outdoor })
    }
}

/// Evaluates the arming conditions against the current readings and local
/// time of day. Only called while unarmed; arming is a one-way latch until
/// the daily reset.
pub(crate) fn should_arm(
    arming: &ArmingSettings,
    indoor: f64,
    outdoor: f64,
    time_of_day: NaiveTime,
) -> bool {
    if arming.temperature_delta.is_none() && arming.time.is_none() {
        tracing::warn!("Neither an arming temperature delta nor an arming time is configured");
        return false;
    }

    let arm_by_temp = arming
        .temperature_delta
        .is_some_and(|delta| outdoor >= indoor + delta);
    let arm_by_time = arming.time.is_some_and(|time| time_of_day >= time);

    if arm_by_temp || arm_by_time {
        tracing::info!(arm_by_temp, arm_by_time, indoor, outdoor, "Arming notifier");
        true
    } else {
        tracing::info!(arm_by_temp, arm_by_time, "Notifier not armed");
        false
    }
}
