//! Metrics configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Every field is defaulted, so an empty document is a valid config.
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.

use recstat_domain::{
    METRIC_NAMES_CONFIG_ROOT, MetricName, MetricNameSet, MetricRole, PrimitiveError,
};
use recstat_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Top-level recstat configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RecstatConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Names the consumer metrics are emitted under.
    pub consumer_metrics: MetricNamesConfig,
}

impl Default for RecstatConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            consumer_metrics: MetricNamesConfig::default(),
        }
    }
}

impl RecstatConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedRecstatConfig, ConfigSchemaError> {
        self.validate_version()?;
        self.consumer_metrics.normalize();
        let names = self.consumer_metrics.to_name_set()?;
        Ok(ValidatedRecstatConfig { raw: self, names })
    }

    const fn validate_version(&self) -> Result<(), ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        Ok(())
    }
}

/// Validated config wrapper carrying the resolved metric name set.
#[derive(Debug, Clone)]
pub struct ValidatedRecstatConfig {
    raw: RecstatConfig,
    names: MetricNameSet,
}

impl ValidatedRecstatConfig {
    /// Resolved metric names.
    #[must_use]
    pub const fn names(&self) -> &MetricNameSet {
        &self.names
    }

    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &RecstatConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> RecstatConfig {
        self.raw
    }
}

impl AsRef<RecstatConfig> for ValidatedRecstatConfig {
    fn as_ref(&self) -> &RecstatConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedRecstatConfig {
    type Target = RecstatConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Metric names, one option per role (`consumerMetrics` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct MetricNamesConfig {
    /// Name of overall record consumption metric.
    pub consumed_counter: String,
    /// Name of overall successful record consumption metric.
    pub consumer_success_counter: String,
    /// Name of overall failed record consumption metric.
    pub consumer_error_counter: String,
    /// Name of consumed record size metric.
    pub consumed_size: String,
    /// Name of lag time between production and consumption metric.
    pub consumer_lag: String,
    /// Name of time to process successful record metric.
    pub consumer_timing_success: String,
    /// Name of time to process failed record metric.
    pub consumer_timing_failure: String,
}

impl Default for MetricNamesConfig {
    fn default() -> Self {
        Self {
            consumed_counter: MetricRole::Consumed.default_name().to_owned(),
            consumer_success_counter: MetricRole::Success.default_name().to_owned(),
            consumer_error_counter: MetricRole::Error.default_name().to_owned(),
            consumed_size: MetricRole::ConsumedSize.default_name().to_owned(),
            consumer_lag: MetricRole::Lag.default_name().to_owned(),
            consumer_timing_success: MetricRole::TimingSuccess.default_name().to_owned(),
            consumer_timing_failure: MetricRole::TimingFailure.default_name().to_owned(),
        }
    }
}

impl MetricNamesConfig {
    /// Configured raw name for `role`.
    #[must_use]
    pub fn get(&self, role: MetricRole) -> &str {
        match role {
            MetricRole::Consumed => &self.consumed_counter,
            MetricRole::Success => &self.consumer_success_counter,
            MetricRole::Error => &self.consumer_error_counter,
            MetricRole::ConsumedSize => &self.consumed_size,
            MetricRole::Lag => &self.consumer_lag,
            MetricRole::TimingSuccess => &self.consumer_timing_success,
            MetricRole::TimingFailure => &self.consumer_timing_failure,
        }
    }

    /// Replace the raw name for `role`.
    pub fn set(&mut self, role: MetricRole, name: impl Into<String>) {
        let slot = match role {
            MetricRole::Consumed => &mut self.consumed_counter,
            MetricRole::Success => &mut self.consumer_success_counter,
            MetricRole::Error => &mut self.consumer_error_counter,
            MetricRole::ConsumedSize => &mut self.consumed_size,
            MetricRole::Lag => &mut self.consumer_lag,
            MetricRole::TimingSuccess => &mut self.consumer_timing_success,
            MetricRole::TimingFailure => &mut self.consumer_timing_failure,
        };
        *slot = name.into();
    }

    /// Validate every name and build the immutable name set.
    pub fn to_name_set(&self) -> Result<MetricNameSet, ConfigSchemaError> {
        MetricRole::ALL
            .into_iter()
            .try_fold(MetricNameSet::default(), |set, role| {
                let name = MetricName::parse(role, self.get(role))
                    .map_err(|error| ConfigSchemaError::invalid_metric_name(role, error))?;
                Ok(set.with_name(role, name))
            })
    }

    fn normalize(&mut self) {
        for role in MetricRole::ALL {
            let trimmed = self.get(role).trim().to_owned();
            self.set(role, trimmed);
        }
    }
}

impl From<&MetricNameSet> for MetricNamesConfig {
    fn from(names: &MetricNameSet) -> Self {
        let mut config = Self::default();
        for (role, name) in names.iter() {
            config.set(role, name.as_str());
        }
        config
    }
}

/// Typed validation errors for the configuration schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A metric name is blank after trimming.
    EmptyMetricName {
        /// Schema section (always `consumerMetrics`).
        section: &'static str,
        /// Option key (e.g. `consumer-lag`).
        field: &'static str,
    },
    /// A metric name contains whitespace/control characters or is too long.
    InvalidMetricName {
        /// Schema section (always `consumerMetrics`).
        section: &'static str,
        /// Option key (e.g. `consumer-lag`).
        field: &'static str,
        /// Rejected value.
        value: String,
    },
}

impl ConfigSchemaError {
    fn invalid_metric_name(role: MetricRole, error: PrimitiveError) -> Self {
        match error {
            PrimitiveError::InvalidMetricName { input, .. } => Self::InvalidMetricName {
                section: METRIC_NAMES_CONFIG_ROOT,
                field: role.option_key(),
                value: input,
            },
            _ => Self::EmptyMetricName {
                section: METRIC_NAMES_CONFIG_ROOT,
                field: role.option_key(),
            },
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::EmptyMetricName { .. } => ErrorCode::new("config", "empty_metric_name"),
            Self::InvalidMetricName { .. } => ErrorCode::new("config", "invalid_metric_name"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version {found} (supported: {supported})"
            ),
            Self::EmptyMetricName { section, field } => {
                write!(formatter, "{section}.{field} must be non-empty")
            },
            Self::InvalidMetricName { section, field, .. } => write!(
                formatter,
                "{section}.{field} must be a metric name without whitespace or control characters"
            ),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::EmptyMetricName { section, field } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field),
            ConfigSchemaError::InvalidMetricName {
                section,
                field,
                value,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value),
        }
    }
}

/// Parse a config from a JSON string, applying validation and normalization.
pub fn parse_recstat_config_json(input: &str) -> Result<ValidatedRecstatConfig, ErrorEnvelope> {
    let config: RecstatConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a config from a TOML string, applying validation and normalization.
pub fn parse_recstat_config_toml(input: &str) -> Result<ValidatedRecstatConfig, ErrorEnvelope> {
    let config: RecstatConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn empty_document_yields_default_names() -> Result<(), Box<dyn Error>> {
        let config = parse_recstat_config_json("{}")?;
        assert_eq!(config.version, CURRENT_CONFIG_VERSION);
        assert_eq!(config.names(), &MetricNameSet::default());
        Ok(())
    }

    #[test]
    fn partial_section_keeps_other_defaults() -> Result<(), Box<dyn Error>> {
        let config = parse_recstat_config_json(
            r#"{ "consumerMetrics": { "consumer-lag": "  orders.lag  " } }"#,
        )?;
        assert_eq!(config.names().lag(), "orders.lag");
        assert_eq!(config.consumer_metrics.consumer_lag, "orders.lag");
        assert_eq!(config.names().consumed(), "kinesis.consumed");
        Ok(())
    }

    #[test]
    fn unknown_option_is_rejected() {
        let error = parse_recstat_config_json(r#"{ "consumerMetrics": { "consumer-typo": "x" } }"#)
            .err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "invalid_json"))
        );
    }

    #[test]
    fn blank_name_fails_with_field_metadata() {
        let error = parse_recstat_config_json(
            r#"{ "consumerMetrics": { "consumer-error-counter": "   " } }"#,
        )
        .err()
        .expect("blank name must fail");

        assert_eq!(error.code, ErrorCode::new("config", "empty_metric_name"));
        assert_eq!(
            error.metadata.get("field").map(String::as_str),
            Some("consumer-error-counter")
        );
    }

    #[test]
    fn name_with_space_is_invalid() {
        let config = RecstatConfig {
            consumer_metrics: MetricNamesConfig {
                consumed_size: "consumed size".to_owned(),
                ..MetricNamesConfig::default()
            },
            ..RecstatConfig::default()
        };

        let error = config.validate_and_normalize().err();
        assert_eq!(
            error,
            Some(ConfigSchemaError::InvalidMetricName {
                section: "consumerMetrics",
                field: "consumed-size",
                value: "consumed size".to_owned(),
            })
        );
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let config = RecstatConfig {
            version: 7,
            ..RecstatConfig::default()
        };
        let envelope: ErrorEnvelope = config
            .validate_and_normalize()
            .err()
            .expect("version 7 is unsupported")
            .into();
        assert_eq!(envelope.code, ErrorCode::new("config", "unsupported_version"));
        assert_eq!(envelope.metadata.get("found").map(String::as_str), Some("7"));
    }

    #[test]
    fn name_set_round_trips_into_config() {
        let names = MetricNameSet::default();
        let config = MetricNamesConfig::from(&names);
        assert_eq!(config, MetricNamesConfig::default());
    }
}
