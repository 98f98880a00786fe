//! Record fixtures.

use recstat_domain::{PartitionKey, SequenceNumber, StreamRecord};
use std::time::{Duration, SystemTime};

/// Sequence number of [`sample_record`].
pub const SAMPLE_SEQUENCE_NUMBER: &str = "12345";

/// Payload of a chat-channel event wrapped in a typed envelope.
#[must_use]
pub fn sample_payload() -> Vec<u8> {
    let raw = serde_json::json!({
        "channel": "channelbob",
        "text": "the message",
    });
    let envelope = serde_json::json!({
        "type": "CHANNEL",
        "rawpayload": raw.to_string(),
    });
    envelope.to_string().into_bytes()
}

/// A realistic record produced at `arrival`.
#[must_use]
#[allow(clippy::expect_used, reason = "fixture literals are valid")]
pub fn sample_record(arrival: SystemTime) -> StreamRecord {
    StreamRecord::new(
        SequenceNumber::parse(SAMPLE_SEQUENCE_NUMBER).expect("sequence number"),
        arrival,
        sample_payload(),
    )
    .with_partition_key(PartitionKey::parse("channelbob").expect("partition key"))
}

/// A record with the given sequence number, epoch-millisecond arrival and payload.
#[must_use]
#[allow(clippy::expect_used, reason = "fixture sequence numbers are valid")]
pub fn record_at(sequence_number: &str, arrival_epoch_ms: u64, payload: &[u8]) -> StreamRecord {
    StreamRecord::new(
        SequenceNumber::parse(sequence_number).expect("sequence number"),
        SystemTime::UNIX_EPOCH + Duration::from_millis(arrival_epoch_ms),
        payload.to_vec(),
    )
}

/// `count` small records with sequence numbers `0..count`.
#[must_use]
pub fn record_batch(count: usize, arrival_epoch_ms: u64) -> Vec<StreamRecord> {
    (0..count)
        .map(|index| {
            let payload = format!("record-{index}");
            record_at(&index.to_string(), arrival_epoch_ms, payload.as_bytes())
        })
        .collect()
}
