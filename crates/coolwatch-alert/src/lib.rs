//! Decision engine for the coolwatch temperature notifier.
//!
//! The engine compares the latest indoor and outdoor temperature readings on
//! every invocation and walks a fixed sequence of gates — daily reset, indoor
//! threshold, arming, rapid-change detection, cooldown/re-enable — before
//! deciding whether to notify. All cross-invocation memory lives in a
//! [`state::NotifierState`] persisted through a [`state::StateStore`].

pub mod engine;
pub mod settings;
pub mod state;
pub mod window;


use async_trait::async_trait;
use coolwatch_common::types::Measurement;

/// Source of current temperature readings.
///
/// Implementations query a time-series backend for the most recent sample of
/// a measurement/field pair. `Ok(None)` means no data exists within the
/// backend's retention — distinct from `Err`, which means the backend could
/// not be reached or refused the query.
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    /// Returns the most recent value for the given measurement, or `None`
    /// when the backend holds no data for it.
    async fn last_value(&self, measurement: &Measurement) -> anyhow::Result<Option<f64>>;
}
