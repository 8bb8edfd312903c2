use chrono::{DateTime, Duration, Utc};
use coolwatch_common::types::Sample;
use std::collections::VecDeque;

/// Time-bounded buffer of recent outdoor-temperature samples.
///
/// Samples are kept in append order, which is also chronological order —
/// out-of-order timestamps are not supported. Every retained sample
/// satisfies `time >= newest.time - window_minutes`.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow {
    window_minutes: i64,
    samples: VecDeque<Sample>,
}

impl RollingWindow {
    pub fn new(window_minutes: u32) -> Self {
        Self {
            window_minutes: i64::from(window_minutes),
            samples: VecDeque::new(),
        }
    }

    /// Rebuilds a window from persisted samples. The samples are taken as-is;
    /// eviction happens on the next [`append`](Self::append).
    pub fn from_samples(window_minutes: u32, samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            window_minutes: i64::from(window_minutes),
            samples: samples.into_iter().collect(),
        }
    }

    /// Appends a sample, then evicts samples older than
    /// `time - window_minutes` from the oldest end.
    pub fn append(&mut self, time: DateTime<Utc>, temperature: f64) {
        self.samples.push_back(Sample { time, temperature });
        let cutoff = time - Duration::minutes(self.window_minutes);
        while let Some(front) = self.samples.front() {
            if front.time < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Detects a significant rise followed by a significant drop within the
    /// window.
    ///
    /// The first occurrence of the maximum temperature is the hinge: the rise
    /// is measured against the minimum before it, the drop against the
    /// minimum after it. Multiple oscillations within one window collapse
    /// into a single event.
    pub fn has_significant_rise_and_drop(&self, rise_threshold: f64, drop_threshold: f64) -> bool {
        if self.samples.len() < 3 {
            return false;
        }

        let mut max_index = 0;
        for (i, sample) in self.samples.iter().enumerate() {
            if sample.temperature > self.samples[max_index].temperature {
                max_index = i;
            }
        }
        // No room for a preceding rise or a following drop.
        if max_index == 0 || max_index == self.samples.len() - 1 {
            return false;
        }

        let max_value = self.samples[max_index].temperature;
        let min_before = self
            .samples
            .iter()
            .take(max_index)
            .map(|s| s.temperature)
            .fold(f64::INFINITY, f64::min);
        let min_after = self
            .samples
            .iter()
            .skip(max_index + 1)
            .map(|s| s.temperature)
            .fold(f64::INFINITY, f64::min);

        let rise = max_value - min_before;
        let drop = max_value - min_after;
        tracing::debug!(
            samples = self.samples.len(),
            rise,
            drop,
            "Evaluated rolling window for a rapid change event"
        );

        rise >= rise_threshold && drop >= drop_threshold
    }

    /// Whether `timestamp` falls between the oldest and newest retained
    /// sample, inclusive. Always false for an empty window.
    pub fn is_within_window(&self, timestamp: DateTime<Utc>) -> bool {
        match (self.samples.front(), self.samples.back()) {
            (Some(oldest), Some(newest)) => oldest.time <= timestamp && timestamp <= newest.time,
            _ => false,
        }
    }

    pub fn samples(&self) -> &VecDeque<Sample> {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
