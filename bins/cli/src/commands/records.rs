//! JSON-lines record input for `replay`.
//!
//! One record per line:
//! `{"sequenceNumber":"1","approximateArrivalTimestampMs":1700000000000,"data":"<base64>","partitionKey":"pk"}`.
//! Blank lines are skipped.

use crate::error::CliError;
use base64::Engine;
use base64::engine::general_purpose;
use recstat_domain::{PartitionKey, SequenceNumber, StreamRecord, system_time_from_epoch_ms};
use recstat_shared::ErrorEnvelope;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RecordLine {
    sequence_number: String,
    approximate_arrival_timestamp_ms: i64,
    data: String,
    #[serde(default)]
    partition_key: Option<String>,
}

/// Parse every non-blank line of `input` into a record.
pub fn parse_records(input: &str) -> Result<Vec<StreamRecord>, CliError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_record_line(index + 1, line))
        .collect()
}

fn parse_record_line(line_number: usize, line: &str) -> Result<StreamRecord, CliError> {
    let invalid = |message: String| CliError::InvalidInput(format!("line {line_number}: {message}"));

    let parsed: RecordLine =
        serde_json::from_str(line).map_err(|error| invalid(format!("invalid record: {error}")))?;
    let sequence_number = SequenceNumber::parse(&parsed.sequence_number)
        .map_err(|error| invalid(ErrorEnvelope::from(error).message))?;
    let payload = general_purpose::STANDARD
        .decode(parsed.data.trim())
        .map_err(|error| invalid(format!("data is not valid base64: {error}")))?;

    let record = StreamRecord::new(
        sequence_number,
        system_time_from_epoch_ms(parsed.approximate_arrival_timestamp_ms),
        payload,
    );
    match parsed.partition_key {
        Some(key) => {
            let key =
                PartitionKey::parse(key).map_err(|error| invalid(ErrorEnvelope::from(error).message))?;
            Ok(record.with_partition_key(key))
        },
        None => Ok(record),
    }
}
