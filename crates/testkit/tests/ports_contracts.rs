//! Contract-style tests for port traits using in-memory adapters.

use recstat_ports::{
    ClockPort, ProcessorFn, RecordProcessor, StreamRecord, TelemetryPort, apply_layers,
    bind_telemetry, require_telemetry,
};
use recstat_shared::{Result, Scope};
use recstat_testkit::fixtures::sample_record;
use recstat_testkit::in_memory::{ManualClock, RecordingTelemetry};
use recstat_testkit::processors::ScriptedProcessor;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn telemetry_port_contract_smoke() {
    let recorder = RecordingTelemetry::new();
    let port: Arc<dyn TelemetryPort> = Arc::new(recorder.clone());

    let copy = port.copy_handle();
    copy.increment_counter("records", 2, None);
    port.increment_counter("records", 1, None);

    assert_eq!(recorder.counter_total("records"), 3);
    assert_eq!(recorder.copies_made(), 1);
}

#[test]
fn scope_bound_telemetry_reaches_processor() -> Result<()> {
    let recorder = RecordingTelemetry::new();
    let scope = bind_telemetry(&Scope::root(), recorder.copy_handle());
    let processor = ProcessorFn::new(|scope: &Scope, _record: &StreamRecord| -> Result<()> {
        require_telemetry(scope)?.increment_counter("seen", 1, None);
        Ok(())
    });

    processor.process(&scope, &sample_record(std::time::SystemTime::UNIX_EPOCH))?;
    assert_eq!(recorder.counter_total("seen"), 1);
    Ok(())
}

#[test]
fn layered_processor_reaches_scripted_terminal() -> Result<()> {
    let clock = ManualClock::at_epoch_ms(0);
    let terminal = Arc::new(
        ScriptedProcessor::succeeding().advancing(clock.clone(), Duration::from_millis(5)),
    );
    let stack = apply_layers(terminal.clone(), &[]);

    let before = clock.monotonic();
    stack.process(&Scope::root(), &sample_record(clock.now()))?;

    assert_eq!(terminal.call_count(), 1);
    assert_eq!(clock.monotonic() - before, Duration::from_millis(5));
    Ok(())
}
