//! Domain primitives with validated constructors.

use recstat_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted length (in bytes) of a metric name.
pub const MAX_METRIC_NAME_BYTES: usize = 200;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `SequenceNumber` is empty after trimming.
    EmptySequenceNumber {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `PartitionKey` is empty after trimming.
    EmptyPartitionKey {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `MetricName` is empty after trimming.
    EmptyMetricName {
        /// Metric role (option key) the name was supplied for.
        role: &'static str,
    },
    /// `MetricName` contains whitespace/control characters or is too long.
    InvalidMetricName {
        /// Metric role (option key) the name was supplied for.
        role: &'static str,
        /// Trimmed input that failed validation.
        input: String,
    },
    /// A `MetricNameSet` was assembled without a name for one role.
    MissingMetricName {
        /// Metric role (option key) left unset.
        role: &'static str,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptySequenceNumber { .. } => ErrorCode::new("domain", "invalid_sequence_number"),
            Self::EmptyPartitionKey { .. } => ErrorCode::new("domain", "invalid_partition_key"),
            Self::EmptyMetricName { .. } | Self::InvalidMetricName { .. } => {
                ErrorCode::new("domain", "invalid_metric_name")
            },
            Self::MissingMetricName { .. } => ErrorCode::new("domain", "missing_metric_name"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySequenceNumber { .. } => {
                formatter.write_str("SequenceNumber must be non-empty")
            },
            Self::EmptyPartitionKey { .. } => formatter.write_str("PartitionKey must be non-empty"),
            Self::EmptyMetricName { role } => {
                write!(formatter, "metric name for {role} must be non-empty")
            },
            Self::InvalidMetricName { role, .. } => write!(
                formatter,
                "metric name for {role} must be at most {MAX_METRIC_NAME_BYTES} bytes without whitespace or control characters"
            ),
            Self::MissingMetricName { role } => {
                write!(formatter, "metric name for {role} is required")
            },
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());

        match error {
            PrimitiveError::EmptySequenceNumber { input_length }
            | PrimitiveError::EmptyPartitionKey { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::EmptyMetricName { role }
            | PrimitiveError::MissingMetricName { role } => envelope.with_metadata("role", role),
            PrimitiveError::InvalidMetricName { role, input } => envelope
                .with_metadata("role", role)
                .with_metadata("input", input),
        }
    }
}

/// Sequence identifier assigned to a record by the upstream stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceNumber(Box<str>);

impl SequenceNumber {
    /// Parse a `SequenceNumber` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptySequenceNumber {
                input_length: raw.len(),
            });
        };

        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SequenceNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Partition key the producer attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(Box<str>);

impl PartitionKey {
    /// Parse a `PartitionKey` from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let Some(trimmed) = trimmed_non_empty(raw) else {
            return Err(PrimitiveError::EmptyPartitionKey {
                input_length: raw.len(),
            });
        };

        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

pub(crate) fn trimmed_non_empty(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
