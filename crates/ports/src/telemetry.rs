//! Telemetry boundary contract (counters + timings) and its scope binding.

use recstat_domain::SignedDuration;
use recstat_shared::{Result, Scope};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Telemetry tags. Keep tags low-cardinality.
pub type TelemetryTags = BTreeMap<Box<str>, Box<str>>;

/// Boundary contract for a metrics sink.
///
/// Implementations own their own thread-safe aggregation; callers may emit
/// from many threads at once through independent handles.
pub trait TelemetryPort: Send + Sync {
    /// Increment a counter by `value`.
    fn increment_counter(&self, name: &str, value: u64, tags: Option<&TelemetryTags>);

    /// Record one timing sample. Negative samples are recorded as-is.
    fn record_timing(&self, name: &str, elapsed: SignedDuration, tags: Option<&TelemetryTags>);

    /// Produce an independent handle with the same backend configuration.
    fn copy_handle(&self) -> Arc<dyn TelemetryPort>;
}

impl<T> TelemetryPort for Arc<T>
where
    T: TelemetryPort + ?Sized,
{
    fn increment_counter(&self, name: &str, value: u64, tags: Option<&TelemetryTags>) {
        (**self).increment_counter(name, value, tags);
    }

    fn record_timing(&self, name: &str, elapsed: SignedDuration, tags: Option<&TelemetryTags>) {
        (**self).record_timing(name, elapsed, tags);
    }

    fn copy_handle(&self) -> Arc<dyn TelemetryPort> {
        (**self).copy_handle()
    }
}

/// Scope entry holding the per-invocation metrics sink.
#[derive(Clone)]
struct BoundTelemetry(Arc<dyn TelemetryPort>);

/// Derive a child scope with `telemetry` bound as the invocation's sink.
#[must_use]
pub fn bind_telemetry(scope: &Scope, telemetry: Arc<dyn TelemetryPort>) -> Scope {
    scope.with_value(BoundTelemetry(telemetry))
}

/// Fetch the sink bound to `scope`, if any.
#[must_use]
pub fn telemetry_from_scope(scope: &Scope) -> Option<Arc<dyn TelemetryPort>> {
    scope
        .get::<BoundTelemetry>()
        .map(|bound| Arc::clone(&bound.0))
}

/// Fetch the sink bound to `scope`, failing with `core:scope_value_missing`.
pub fn require_telemetry(scope: &Scope) -> Result<Arc<dyn TelemetryPort>> {
    scope
        .require::<BoundTelemetry>("telemetry")
        .map(|bound| Arc::clone(&bound.0))
}
