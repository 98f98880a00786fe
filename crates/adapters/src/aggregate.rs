//! In-process metric aggregation.
//!
//! Every handle copied from an `AggregatingTelemetry` shares one registry, so
//! concurrent invocations each emit through their own handle while the totals
//! stay exact.

use crate::telemetry::saturating_micros;
use recstat_ports::{SignedDuration, TelemetryPort, TelemetryTags};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Aggregated samples for one timing name (microseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingSummary {
    /// Number of samples.
    pub count: u64,
    /// Sum of all samples.
    pub sum_us: i64,
    /// Smallest sample.
    pub min_us: i64,
    /// Largest sample.
    pub max_us: i64,
}

impl TimingSummary {
    const fn first(sample: i64) -> Self {
        Self {
            count: 1,
            sum_us: sample,
            min_us: sample,
            max_us: sample,
        }
    }

    fn record(&mut self, sample: i64) {
        self.count += 1;
        self.sum_us = self.sum_us.saturating_add(sample);
        self.min_us = self.min_us.min(sample);
        self.max_us = self.max_us.max(sample);
    }
}

/// Point-in-time copy of every aggregated metric, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Counter totals.
    pub counters: BTreeMap<String, u64>,
    /// Timing summaries.
    pub timings: BTreeMap<String, TimingSummary>,
}

impl MetricsSnapshot {
    /// Total for counter `name` (0 when never incremented).
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or_default()
    }

    /// Summary for timing `name`, if any sample was recorded.
    #[must_use]
    pub fn timing(&self, name: &str) -> Option<&TimingSummary> {
        self.timings.get(name)
    }
}

/// Telemetry adapter that aggregates emissions in memory. Tags are ignored.
#[derive(Debug, Clone, Default)]
pub struct AggregatingTelemetry {
    registry: Arc<Mutex<MetricsSnapshot>>,
}

impl AggregatingTelemetry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current totals.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.registry().clone()
    }

    fn registry(&self) -> MutexGuard<'_, MetricsSnapshot> {
        // Each update is a single insert, so a poisoned guard still holds consistent data.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TelemetryPort for AggregatingTelemetry {
    fn increment_counter(&self, name: &str, value: u64, _tags: Option<&TelemetryTags>) {
        let mut registry = self.registry();
        let total = registry.counters.entry(name.to_owned()).or_default();
        *total = total.saturating_add(value);
        drop(registry);
    }

    fn record_timing(&self, name: &str, elapsed: SignedDuration, _tags: Option<&TelemetryTags>) {
        let sample = saturating_micros(elapsed);
        self.registry()
            .timings
            .entry(name.to_owned())
            .and_modify(|summary| summary.record(sample))
            .or_insert_with(|| TimingSummary::first(sample));
    }

    fn copy_handle(&self) -> Arc<dyn TelemetryPort> {
        Arc::new(self.clone())
    }
}
