//! Metric roles and the validated name set a consumer emits under.

use crate::primitives::{MAX_METRIC_NAME_BYTES, PrimitiveError, trimmed_non_empty};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Config root under which metric names are configured.
pub const METRIC_NAMES_CONFIG_ROOT: &str = "consumerMetrics";

/// Default name: per-record consumption count.
pub const DEFAULT_CONSUMED_COUNTER: &str = "kinesis.consumed";
/// Default name: successful record count.
pub const DEFAULT_CONSUMER_SUCCESS_COUNTER: &str = "kinesis.consumer_success";
/// Default name: failed record count.
pub const DEFAULT_CONSUMER_ERROR_COUNTER: &str = "kinesis.consumer_error";
/// Default name: consumed payload size.
pub const DEFAULT_CONSUMED_SIZE: &str = "kinesis.consumed_size";
/// Default name: production-to-consumption lag timing.
pub const DEFAULT_CONSUMER_LAG: &str = "kinesis.consumer_lag.timing";
/// Default name: processing duration of successful records.
pub const DEFAULT_CONSUMER_TIMING_SUCCESS: &str = "kinesis.consumer.timing.success";
/// Default name: processing duration of failed records.
pub const DEFAULT_CONSUMER_TIMING_FAILURE: &str = "kinesis.consumer.timing.failure";

/// Logical measurement role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricRole {
    /// Incremented for every record received, regardless of outcome.
    Consumed,
    /// Incremented for every record processed successfully.
    Success,
    /// Incremented for every record that failed processing.
    Error,
    /// Incremented by the payload length of every record.
    ConsumedSize,
    /// Time between record production and the start of processing.
    Lag,
    /// Processing duration of successful records.
    TimingSuccess,
    /// Processing duration of failed records.
    TimingFailure,
}

impl MetricRole {
    /// Every role, in configuration order.
    pub const ALL: [Self; 7] = [
        Self::Consumed,
        Self::Success,
        Self::Error,
        Self::ConsumedSize,
        Self::Lag,
        Self::TimingSuccess,
        Self::TimingFailure,
    ];

    /// Configuration option key for this role.
    #[must_use]
    pub const fn option_key(self) -> &'static str {
        match self {
            Self::Consumed => "consumed-counter",
            Self::Success => "consumer-success-counter",
            Self::Error => "consumer-error-counter",
            Self::ConsumedSize => "consumed-size",
            Self::Lag => "consumer-lag",
            Self::TimingSuccess => "consumer-timing-success",
            Self::TimingFailure => "consumer-timing-failure",
        }
    }

    /// Name emitted when the role is not configured.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Consumed => DEFAULT_CONSUMED_COUNTER,
            Self::Success => DEFAULT_CONSUMER_SUCCESS_COUNTER,
            Self::Error => DEFAULT_CONSUMER_ERROR_COUNTER,
            Self::ConsumedSize => DEFAULT_CONSUMED_SIZE,
            Self::Lag => DEFAULT_CONSUMER_LAG,
            Self::TimingSuccess => DEFAULT_CONSUMER_TIMING_SUCCESS,
            Self::TimingFailure => DEFAULT_CONSUMER_TIMING_FAILURE,
        }
    }

    /// Human-readable description, used in generated config docs.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Consumed => "Name of overall record consumption metric.",
            Self::Success => "Name of overall successful record consumption metric.",
            Self::Error => "Name of overall failed record consumption metric.",
            Self::ConsumedSize => "Name of consumed record size metric.",
            Self::Lag => "Name of lag time between production and consumption metric.",
            Self::TimingSuccess => "Name of time to process successful record metric.",
            Self::TimingFailure => "Name of time to process failed record metric.",
        }
    }
}

impl fmt::Display for MetricRole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.option_key())
    }
}

/// A validated metric name: non-empty, no whitespace or control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MetricName(Box<str>);

impl MetricName {
    /// Parse a metric name supplied for `role`.
    pub fn parse(role: MetricRole, input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let Some(trimmed) = trimmed_non_empty(input.as_ref()) else {
            return Err(PrimitiveError::EmptyMetricName {
                role: role.option_key(),
            });
        };

        let malformed = trimmed.len() > MAX_METRIC_NAME_BYTES
            || trimmed
                .chars()
                .any(|ch| ch.is_whitespace() || ch.is_control());
        if malformed {
            return Err(PrimitiveError::InvalidMetricName {
                role: role.option_key(),
                input: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    fn default_for(role: MetricRole) -> Self {
        Self(role.default_name().to_owned().into_boxed_str())
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MetricName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One validated name per metric role.
///
/// A set is always fully populated: the only constructors either start from
/// the defaults or reject a missing role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricNameSet {
    consumed: MetricName,
    success: MetricName,
    error: MetricName,
    consumed_size: MetricName,
    lag: MetricName,
    timing_success: MetricName,
    timing_failure: MetricName,
}

impl Default for MetricNameSet {
    fn default() -> Self {
        Self {
            consumed: MetricName::default_for(MetricRole::Consumed),
            success: MetricName::default_for(MetricRole::Success),
            error: MetricName::default_for(MetricRole::Error),
            consumed_size: MetricName::default_for(MetricRole::ConsumedSize),
            lag: MetricName::default_for(MetricRole::Lag),
            timing_success: MetricName::default_for(MetricRole::TimingSuccess),
            timing_failure: MetricName::default_for(MetricRole::TimingFailure),
        }
    }
}

impl MetricNameSet {
    /// Build a set from raw names; every role must be present and valid.
    pub fn from_names<S>(names: &BTreeMap<MetricRole, S>) -> Result<Self, PrimitiveError>
    where
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for role in MetricRole::ALL {
            let Some(raw) = names.get(&role) else {
                return Err(PrimitiveError::MissingMetricName {
                    role: role.option_key(),
                });
            };
            *set.slot_mut(role) = MetricName::parse(role, raw)?;
        }
        Ok(set)
    }

    /// Replace the name for one role.
    #[must_use]
    pub fn with_name(mut self, role: MetricRole, name: MetricName) -> Self {
        *self.slot_mut(role) = name;
        self
    }

    /// Name emitted for `role`.
    #[must_use]
    pub const fn name(&self, role: MetricRole) -> &MetricName {
        match role {
            MetricRole::Consumed => &self.consumed,
            MetricRole::Success => &self.success,
            MetricRole::Error => &self.error,
            MetricRole::ConsumedSize => &self.consumed_size,
            MetricRole::Lag => &self.lag,
            MetricRole::TimingSuccess => &self.timing_success,
            MetricRole::TimingFailure => &self.timing_failure,
        }
    }

    /// Consumed counter name.
    #[must_use]
    pub fn consumed(&self) -> &str {
        self.consumed.as_str()
    }

    /// Success counter name.
    #[must_use]
    pub fn success(&self) -> &str {
        self.success.as_str()
    }

    /// Error counter name.
    #[must_use]
    pub fn error(&self) -> &str {
        self.error.as_str()
    }

    /// Consumed size counter name.
    #[must_use]
    pub fn consumed_size(&self) -> &str {
        self.consumed_size.as_str()
    }

    /// Lag timing name.
    #[must_use]
    pub fn lag(&self) -> &str {
        self.lag.as_str()
    }

    /// Success timing name.
    #[must_use]
    pub fn timing_success(&self) -> &str {
        self.timing_success.as_str()
    }

    /// Failure timing name.
    #[must_use]
    pub fn timing_failure(&self) -> &str {
        self.timing_failure.as_str()
    }

    /// Iterate `(role, name)` pairs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricRole, &MetricName)> {
        MetricRole::ALL.into_iter().map(|role| (role, self.name(role)))
    }

    const fn slot_mut(&mut self, role: MetricRole) -> &mut MetricName {
        match role {
            MetricRole::Consumed => &mut self.consumed,
            MetricRole::Success => &mut self.success,
            MetricRole::Error => &mut self.error,
            MetricRole::ConsumedSize => &mut self.consumed_size,
            MetricRole::Lag => &mut self.lag,
            MetricRole::TimingSuccess => &mut self.timing_success,
            MetricRole::TimingFailure => &mut self.timing_failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_map() -> BTreeMap<MetricRole, String> {
        MetricRole::ALL
            .into_iter()
            .map(|role| (role, format!("custom.{}", role.option_key())))
            .collect()
    }

    #[test]
    fn defaults_match_documented_names() {
        let set = MetricNameSet::default();
        assert_eq!(set.consumed(), "kinesis.consumed");
        assert_eq!(set.success(), "kinesis.consumer_success");
        assert_eq!(set.error(), "kinesis.consumer_error");
        assert_eq!(set.consumed_size(), "kinesis.consumed_size");
        assert_eq!(set.lag(), "kinesis.consumer_lag.timing");
        assert_eq!(set.timing_success(), "kinesis.consumer.timing.success");
        assert_eq!(set.timing_failure(), "kinesis.consumer.timing.failure");
    }

    #[test]
    fn from_names_requires_every_role() {
        let mut names = full_map();
        names.remove(&MetricRole::Success);

        let error = MetricNameSet::from_names(&names).err();
        assert_eq!(
            error,
            Some(PrimitiveError::MissingMetricName {
                role: "consumer-success-counter"
            })
        );
    }

    #[test]
    fn from_names_uses_supplied_names() {
        let set = MetricNameSet::from_names(&full_map()).expect("complete map");
        assert_eq!(set.lag(), "custom.consumer-lag");
        assert_eq!(
            set.name(MetricRole::TimingFailure).as_str(),
            "custom.consumer-timing-failure"
        );
    }

    #[test]
    fn metric_name_rejects_blank_and_whitespace() {
        assert!(matches!(
            MetricName::parse(MetricRole::Error, "  "),
            Err(PrimitiveError::EmptyMetricName { .. })
        ));
        assert!(matches!(
            MetricName::parse(MetricRole::Error, "consumer error"),
            Err(PrimitiveError::InvalidMetricName { .. })
        ));
        assert!(matches!(
            MetricName::parse(MetricRole::Error, "x".repeat(MAX_METRIC_NAME_BYTES + 1)),
            Err(PrimitiveError::InvalidMetricName { .. })
        ));
    }

    #[test]
    fn with_name_replaces_single_role() {
        let name = MetricName::parse(MetricRole::Consumed, "stream.consumed").expect("valid");
        let set = MetricNameSet::default().with_name(MetricRole::Consumed, name);

        assert_eq!(set.consumed(), "stream.consumed");
        assert_eq!(set.success(), DEFAULT_CONSUMER_SUCCESS_COUNTER);
    }

    #[test]
    fn iter_follows_configuration_order() {
        let keys: Vec<&str> = MetricNameSet::default()
            .iter()
            .map(|(role, _)| role.option_key())
            .collect();
        assert_eq!(
            keys,
            vec![
                "consumed-counter",
                "consumer-success-counter",
                "consumer-error-counter",
                "consumed-size",
                "consumer-lag",
                "consumer-timing-success",
                "consumer-timing-failure",
            ]
        );
    }
}
