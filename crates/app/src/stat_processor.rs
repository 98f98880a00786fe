//! Metrics decorator around a record processor.
//!
//! Per invocation, in this order:
//!
//! 1. lag timing (`now - approximate arrival`, negative values kept)
//! 2. consumed counter (`1`)
//! 3. consumed size counter (payload bytes)
//! 4. delegate to the inner processor
//! 5. success or error counter (`1`)
//! 6. success or failure timing (inner processing time)
//!
//! The inner outcome is returned as produced.

use recstat_config::MetricNamesConfig;
use recstat_domain::{METRIC_NAMES_CONFIG_ROOT, MetricNameSet, SignedDuration, StreamRecord};
use recstat_ports::{
    ClockPort, ProcessorLayer, RecordProcessor, SystemClock, TelemetryPort, TelemetryTags,
    telemetry_from_scope,
};
use recstat_shared::{ErrorEnvelope, Result, Scope};
use std::fmt;
use std::sync::Arc;

/// Measures one inner invocation per record and emits the consumer metrics.
pub struct StatProcessor {
    names: Arc<MetricNameSet>,
    clock: Arc<dyn ClockPort>,
    inner: Arc<dyn RecordProcessor>,
}

impl StatProcessor {
    /// Wrap `inner`, emitting under `names` and timing with the system clock.
    pub fn new(names: Arc<MetricNameSet>, inner: Arc<dyn RecordProcessor>) -> Self {
        Self {
            names,
            clock: Arc::new(SystemClock),
            inner,
        }
    }

    /// Wrap `inner` with the default metric names.
    pub fn with_defaults(inner: Arc<dyn RecordProcessor>) -> Self {
        Self::new(Arc::new(MetricNameSet::default()), inner)
    }

    /// Replace the clock used for lag and elapsed time.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn ClockPort>) -> Self {
        self.clock = clock;
        self
    }

    /// Metric names this decorator emits under.
    #[must_use]
    pub fn names(&self) -> &MetricNameSet {
        &self.names
    }
}

impl RecordProcessor for StatProcessor {
    fn process(&self, scope: &Scope, record: &StreamRecord) -> Result<()> {
        let sink = telemetry_from_scope(scope).unwrap_or_else(|| {
            tracing::debug!(
                correlation_id = %scope.correlation_id(),
                sequence_number = %record.sequence_number(),
                "no telemetry bound to scope; metrics dropped"
            );
            let discard: Arc<dyn TelemetryPort> = Arc::new(DiscardTelemetry);
            discard
        });
        let names = &*self.names;

        let lag = SignedDuration::between(record.approximate_arrival(), self.clock.now());
        sink.record_timing(names.lag(), lag, None);
        sink.increment_counter(names.consumed(), 1, None);
        let size = u64::try_from(record.payload_len()).unwrap_or(u64::MAX);
        sink.increment_counter(names.consumed_size(), size, None);

        let started = self.clock.monotonic();
        let outcome = self.inner.process(scope, record);
        let elapsed = SignedDuration::from_std(
            self.clock.monotonic().saturating_duration_since(started),
        );

        let (counter, timing) = if outcome.is_ok() {
            (names.success(), names.timing_success())
        } else {
            (names.error(), names.timing_failure())
        };
        sink.increment_counter(counter, 1, None);
        sink.record_timing(timing, elapsed, None);

        outcome
    }
}

impl fmt::Debug for StatProcessor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StatProcessor")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

/// Sink used when nothing is bound to the scope.
struct DiscardTelemetry;

impl TelemetryPort for DiscardTelemetry {
    fn increment_counter(&self, _name: &str, _value: u64, _tags: Option<&TelemetryTags>) {}

    fn record_timing(&self, _name: &str, _elapsed: SignedDuration, _tags: Option<&TelemetryTags>) {
    }

    fn copy_handle(&self) -> Arc<dyn TelemetryPort> {
        Arc::new(Self)
    }
}

/// Layer form of [`StatProcessor`] using the system clock.
#[must_use]
pub fn stat_processor_layer(names: Arc<MetricNameSet>) -> ProcessorLayer {
    stat_processor_layer_with_clock(names, Arc::new(SystemClock))
}

/// Layer form of [`StatProcessor`] with an explicit clock.
#[must_use]
pub fn stat_processor_layer_with_clock(
    names: Arc<MetricNameSet>,
    clock: Arc<dyn ClockPort>,
) -> ProcessorLayer {
    Arc::new(move |inner| {
        Arc::new(StatProcessor::new(Arc::clone(&names), inner).with_clock(Arc::clone(&clock)))
    })
}

/// Settings-driven factory for the metrics decorator.
///
/// Mirrors a pluggable pipeline component: it advertises its configuration
/// root and default settings, and builds a layer from validated settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatProcessorComponent;

impl StatProcessorComponent {
    /// Configuration section this component reads.
    pub const CONFIG_ROOT: &'static str = METRIC_NAMES_CONFIG_ROOT;

    /// Default settings (every role set to its default name).
    #[must_use]
    pub fn settings(self) -> MetricNamesConfig {
        MetricNamesConfig::default()
    }

    /// Validate `settings` and build the decorator layer.
    pub fn layer(self, settings: &MetricNamesConfig) -> Result<ProcessorLayer> {
        let names = settings.to_name_set().map_err(ErrorEnvelope::from)?;
        Ok(stat_processor_layer(Arc::new(names)))
    }
}
