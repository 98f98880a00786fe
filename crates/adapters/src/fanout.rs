//! Fan-out telemetry: one emission, several sinks.

use recstat_ports::{SignedDuration, TelemetryPort, TelemetryTags};
use std::sync::Arc;

/// Forwards every emission to each member sink, in order.
#[derive(Clone, Default)]
pub struct FanoutTelemetry {
    sinks: Vec<Arc<dyn TelemetryPort>>,
}

impl FanoutTelemetry {
    /// Fan out to `sinks`.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn TelemetryPort>>) -> Self {
        Self { sinks }
    }

    /// Add one more member sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TelemetryPort>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of member sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true when there are no member sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl TelemetryPort for FanoutTelemetry {
    fn increment_counter(&self, name: &str, value: u64, tags: Option<&TelemetryTags>) {
        for sink in &self.sinks {
            sink.increment_counter(name, value, tags);
        }
    }

    fn record_timing(&self, name: &str, elapsed: SignedDuration, tags: Option<&TelemetryTags>) {
        for sink in &self.sinks {
            sink.record_timing(name, elapsed, tags);
        }
    }

    fn copy_handle(&self) -> Arc<dyn TelemetryPort> {
        Arc::new(Self {
            sinks: self.sinks.iter().map(TelemetryPort::copy_handle).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregatingTelemetry;
    use std::time::Duration;

    #[test]
    fn every_member_sees_every_emission() {
        let first = AggregatingTelemetry::new();
        let second = AggregatingTelemetry::new();
        let fanout = FanoutTelemetry::default()
            .with_sink(Arc::new(first.clone()))
            .with_sink(Arc::new(second.clone()));
        assert_eq!(fanout.len(), 2);

        let copy = fanout.copy_handle();
        copy.increment_counter("consumed", 1, None);
        copy.record_timing(
            "elapsed",
            SignedDuration::from_std(Duration::from_micros(7)),
            None,
        );

        for sink in [first, second] {
            let snapshot = sink.snapshot();
            assert_eq!(snapshot.counter("consumed"), 1);
            assert_eq!(snapshot.timing("elapsed").map(|timing| timing.max_us), Some(7));
        }
    }

    #[test]
    fn empty_fanout_discards() {
        let fanout = FanoutTelemetry::default();
        assert!(fanout.is_empty());
        fanout.increment_counter("consumed", 1, None);
    }
}
