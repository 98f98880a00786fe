//! Scripted record processors for decorator tests.

use crate::in_memory::{ManualClock, RecordingTelemetry};
use recstat_domain::StreamRecord;
use recstat_ports::{RecordProcessor, TelemetryPort, telemetry_from_scope};
use recstat_shared::{ErrorEnvelope, Result, Scope};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// What the processor observed for one invocation.
#[derive(Clone)]
pub struct ProcessorCall {
    /// Sequence number of the processed record.
    pub sequence_number: String,
    /// Correlation id of the scope it was called with.
    pub correlation_id: String,
    /// Payload length of the processed record.
    pub payload_len: usize,
    /// Sink bound to the scope, if any.
    pub telemetry: Option<Arc<dyn TelemetryPort>>,
    /// Emissions already in the observed recorder when the call started.
    pub emissions_before: Option<usize>,
}

impl fmt::Debug for ProcessorCall {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ProcessorCall")
            .field("sequence_number", &self.sequence_number)
            .field("correlation_id", &self.correlation_id)
            .field("payload_len", &self.payload_len)
            .field("telemetry_bound", &self.telemetry.is_some())
            .field("emissions_before", &self.emissions_before)
            .finish()
    }
}

/// A processor whose outcome is scripted per sequence number.
pub struct ScriptedProcessor {
    default_outcome: Result<()>,
    failures: BTreeMap<String, ErrorEnvelope>,
    advance: Option<(ManualClock, Duration)>,
    emit_counter: Option<String>,
    observed: Option<RecordingTelemetry>,
    calls: Mutex<Vec<ProcessorCall>>,
}

impl ScriptedProcessor {
    /// A processor that succeeds for every record.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::with_default(Ok(()))
    }

    /// A processor that fails every record with `error`.
    #[must_use]
    pub fn failing(error: ErrorEnvelope) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default_outcome: Result<()>) -> Self {
        Self {
            default_outcome,
            failures: BTreeMap::new(),
            advance: None,
            emit_counter: None,
            observed: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the record with `sequence_number` with `error`.
    #[must_use]
    pub fn fail_on(mut self, sequence_number: &str, error: ErrorEnvelope) -> Self {
        self.failures.insert(sequence_number.to_owned(), error);
        self
    }

    /// Advance `clock` by `by` while processing each record.
    #[must_use]
    pub fn advancing(mut self, clock: ManualClock, by: Duration) -> Self {
        self.advance = Some((clock, by));
        self
    }

    /// Increment `name` by one through the scope-bound sink on each call.
    #[must_use]
    pub fn emitting(mut self, name: &str) -> Self {
        self.emit_counter = Some(name.to_owned());
        self
    }

    /// Note how many emissions `recorder` holds when each call starts.
    #[must_use]
    pub fn observing(mut self, recorder: &RecordingTelemetry) -> Self {
        self.observed = Some(recorder.clone());
        self
    }

    /// Every observed invocation, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<ProcessorCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of invocations so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl RecordProcessor for ScriptedProcessor {
    fn process(&self, scope: &Scope, record: &StreamRecord) -> Result<()> {
        let emissions_before = self
            .observed
            .as_ref()
            .map(|recorder| recorder.emissions().len());
        let telemetry = telemetry_from_scope(scope);
        if let (Some(name), Some(sink)) = (&self.emit_counter, &telemetry) {
            sink.increment_counter(name, 1, None);
        }
        if let Some((clock, by)) = &self.advance {
            clock.advance(*by);
        }

        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(ProcessorCall {
            sequence_number: record.sequence_number().as_str().to_owned(),
            correlation_id: scope.correlation_id().as_str().to_owned(),
            payload_len: record.payload_len(),
            telemetry,
            emissions_before,
        });

        match self.failures.get(record.sequence_number().as_str()) {
            Some(error) => Err(error.clone()),
            None => self.default_outcome.clone(),
        }
    }
}
