use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// All thresholds the decision engine evaluates. Deserialized as part of the
/// agent configuration and consumed read-only by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSettings {
    pub notification: NotificationSettings,
    pub arming: ArmingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Indoor temperatures at or below this need no alert regardless of
    /// outdoor conditions.
    pub min_indoor_temperature: f64,
    pub rapid_change_event: RapidChangeSettings,
    pub reenable: ReenableSettings,
}

/// Magnitudes and span of the rise-then-drop detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RapidChangeSettings {
    pub rise: f64,
    pub drop: f64,
    pub window_minutes: u32,
}

/// Policy for allowing another notification after one has fired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReenableSettings {
    pub cooldown_minutes: u32,
    pub min_rise_between_notifications: f64,
}

/// Arming conditions. Either may be absent; when both are, the engine logs a
/// warning and never arms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArmingSettings {
    /// Arm when `outdoor >= indoor + temperature_delta`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_delta: Option<f64>,
    /// Arm when the local time of day reaches this `"HH:MM"` time.
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
}

/// Serde adapter for optional `"HH:MM"` times of day.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_some(&t.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Option::deserialize(deserializer)?;
        value
            .map(|s| {
                NaiveTime::parse_from_str(&s, FORMAT).map_err(|e| {
                    serde::de::Error::custom(format!(
                        "invalid arming time '{s}': expected HH:MM ({e})"
                    ))
                })
            })
            .transpose()
    }
}
