//! Integration coverage for metric names and stream records.

use recstat_domain::{
    MetricNameSet, MetricRole, PrimitiveError, SequenceNumber, SignedDuration, StreamRecord,
    system_time_from_epoch_ms,
};
use recstat_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::time::Duration;

#[test]
fn primitive_errors_map_into_error_envelopes() -> Result<(), PrimitiveError> {
    let Err(error) = SequenceNumber::parse("  ") else {
        return Err(PrimitiveError::EmptySequenceNumber { input_length: 0 });
    };

    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.namespace(), "domain");
    assert_eq!(envelope.code.code(), "invalid_sequence_number");
    assert_eq!(envelope.metadata.get("input_length"), Some(&"2".to_string()));

    Ok(())
}

#[test]
fn blank_metric_name_surfaces_role_metadata() {
    let names: BTreeMap<MetricRole, &str> = MetricRole::ALL
        .into_iter()
        .map(|role| (role, if role == MetricRole::Lag { "" } else { "ok.name" }))
        .collect();

    let Err(error) = MetricNameSet::from_names(&names) else {
        panic!("blank lag name must be rejected");
    };

    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.code(), "invalid_metric_name");
    assert_eq!(
        envelope.metadata.get("role"),
        Some(&"consumer-lag".to_string())
    );
}

#[test]
fn lag_from_record_arrival_can_be_negative() {
    let record = StreamRecord::new(
        SequenceNumber::parse("12345").expect("valid"),
        system_time_from_epoch_ms(10_000),
        b"{}".to_vec(),
    );
    let now = system_time_from_epoch_ms(7_000);

    let lag = SignedDuration::between(record.approximate_arrival(), now);
    assert!(lag.is_negative());
    assert_eq!(lag.magnitude(), Duration::from_secs(3));
}

#[test]
fn default_names_are_distinct_per_role() {
    let set = MetricNameSet::default();
    let mut seen: Vec<&str> = set.iter().map(|(_, name)| name.as_str()).collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), MetricRole::ALL.len());
}
