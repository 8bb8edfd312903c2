use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of outdoor temperature.
///
/// The serde field names are the persisted wire format: the state file
/// stores the rolling window as an ordered list of
/// `{"time": <RFC 3339>, "temperature": <number>}` objects.
///
/// # Examples
///
/// ```
/// use coolwatch_common::types::Sample;
/// use chrono::Utc;
///
/// let sample = Sample { time: Utc::now(), temperature: 21.5 };
/// let json = serde_json::to_string(&sample).unwrap();
/// assert!(json.contains("\"temperature\":21.5"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub temperature: f64,
}

/// Names an InfluxDB measurement/field pair to query the last value from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,
    pub field: String,
}

/// The two measurements the decision engine compares on every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurements {
    pub indoor: Measurement,
    pub outdoor: Measurement,
}
