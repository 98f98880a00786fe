//! Stream records as delivered by a shard consumer.

use crate::primitives::{PartitionKey, SequenceNumber};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// One consumed stream record.
///
/// The payload is shared, so cloning a record never copies its bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct StreamRecord {
    sequence_number: SequenceNumber,
    approximate_arrival: SystemTime,
    payload: Arc<[u8]>,
    partition_key: Option<PartitionKey>,
}

impl StreamRecord {
    /// Build a record from its parts.
    pub fn new(
        sequence_number: SequenceNumber,
        approximate_arrival: SystemTime,
        payload: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            sequence_number,
            approximate_arrival,
            payload: payload.into(),
            partition_key: None,
        }
    }

    /// Attach the producer's partition key.
    #[must_use]
    pub fn with_partition_key(mut self, partition_key: PartitionKey) -> Self {
        self.partition_key = Some(partition_key);
        self
    }

    /// Upstream sequence number.
    #[must_use]
    pub const fn sequence_number(&self) -> &SequenceNumber {
        &self.sequence_number
    }

    /// Time the stream accepted the record, as stamped by the producer side.
    #[must_use]
    pub const fn approximate_arrival(&self) -> SystemTime {
        self.approximate_arrival
    }

    /// Arrival time as milliseconds since the Unix epoch (negative before 1970).
    #[must_use]
    pub fn approximate_arrival_ms(&self) -> i128 {
        match self.approximate_arrival.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(since) => i128::try_from(since.as_millis()).unwrap_or(i128::MAX),
            Err(error) => -i128::try_from(error.duration().as_millis()).unwrap_or(i128::MAX),
        }
    }

    /// Raw payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Producer partition key, if one was supplied.
    #[must_use]
    pub const fn partition_key(&self) -> Option<&PartitionKey> {
        self.partition_key.as_ref()
    }
}

impl fmt::Debug for StreamRecord {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StreamRecord")
            .field("sequence_number", &self.sequence_number)
            .field("approximate_arrival_ms", &self.approximate_arrival_ms())
            .field("payload_len", &self.payload.len())
            .field("partition_key", &self.partition_key)
            .finish_non_exhaustive()
    }
}

/// Convert epoch milliseconds (possibly negative) into a `SystemTime`.
#[must_use]
pub fn system_time_from_epoch_ms(epoch_ms: i64) -> SystemTime {
    let magnitude = Duration::from_millis(epoch_ms.unsigned_abs());
    if epoch_ms < 0 {
        SystemTime::UNIX_EPOCH
            .checked_sub(magnitude)
            .unwrap_or(SystemTime::UNIX_EPOCH)
    } else {
        SystemTime::UNIX_EPOCH
            .checked_add(magnitude)
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }
}
