//! Scope binder: gives every invocation its own metrics sink handle.
//!
//! The shared sink is never emitted to directly. Each call copies it, binds
//! the copy into a child scope and delegates, so concurrent invocations
//! never share a handle.

use recstat_domain::StreamRecord;
use recstat_ports::{ProcessorLayer, RecordProcessor, TelemetryPort, bind_telemetry};
use recstat_shared::{Result, Scope};
use std::fmt;
use std::sync::Arc;

/// Binds a per-invocation copy of `sink` before delegating to `inner`.
pub struct StatBinder {
    sink: Arc<dyn TelemetryPort>,
    inner: Arc<dyn RecordProcessor>,
}

impl StatBinder {
    /// Wrap `inner`, binding copies of `sink`.
    pub fn new(sink: Arc<dyn TelemetryPort>, inner: Arc<dyn RecordProcessor>) -> Self {
        Self { sink, inner }
    }
}

impl RecordProcessor for StatBinder {
    fn process(&self, scope: &Scope, record: &StreamRecord) -> Result<()> {
        let handle = self.sink.copy_handle();
        let child = bind_telemetry(scope, handle);
        tracing::trace!(
            correlation_id = %child.correlation_id(),
            sequence_number = %record.sequence_number(),
            "bound telemetry handle"
        );
        self.inner.process(&child, record)
    }
}

impl fmt::Debug for StatBinder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("StatBinder").finish_non_exhaustive()
    }
}

/// Layer form of [`StatBinder`].
#[must_use]
pub fn stat_binder_layer(sink: Arc<dyn TelemetryPort>) -> ProcessorLayer {
    Arc::new(move |inner| Arc::new(StatBinder::new(Arc::clone(&sink), inner)))
}
