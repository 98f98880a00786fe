//! Environment variable parsing and env-to-config merging.
//!
//! This module keeps env parsing:
//! - strict (blank values fail fast)
//! - deterministic (only the known variables are read)
//! - safe (secret-looking variables are redacted in error metadata)

use crate::schema::{RecstatConfig, ValidatedRecstatConfig};
use recstat_domain::MetricRole;
use recstat_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: consumed counter name.
pub const ENV_CONSUMED_COUNTER: &str = "RECSTAT_CONSUMED_COUNTER";
/// Env var: success counter name.
pub const ENV_CONSUMER_SUCCESS_COUNTER: &str = "RECSTAT_CONSUMER_SUCCESS_COUNTER";
/// Env var: error counter name.
pub const ENV_CONSUMER_ERROR_COUNTER: &str = "RECSTAT_CONSUMER_ERROR_COUNTER";
/// Env var: consumed size counter name.
pub const ENV_CONSUMED_SIZE: &str = "RECSTAT_CONSUMED_SIZE";
/// Env var: lag timing name.
pub const ENV_CONSUMER_LAG: &str = "RECSTAT_CONSUMER_LAG";
/// Env var: success timing name.
pub const ENV_CONSUMER_TIMING_SUCCESS: &str = "RECSTAT_CONSUMER_TIMING_SUCCESS";
/// Env var: failure timing name.
pub const ENV_CONSUMER_TIMING_FAILURE: &str = "RECSTAT_CONSUMER_TIMING_FAILURE";

/// Env var carrying the override for `role`.
#[must_use]
pub const fn env_var_for(role: MetricRole) -> &'static str {
    match role {
        MetricRole::Consumed => ENV_CONSUMED_COUNTER,
        MetricRole::Success => ENV_CONSUMER_SUCCESS_COUNTER,
        MetricRole::Error => ENV_CONSUMER_ERROR_COUNTER,
        MetricRole::ConsumedSize => ENV_CONSUMED_SIZE,
        MetricRole::Lag => ENV_CONSUMER_LAG,
        MetricRole::TimingSuccess => ENV_CONSUMER_TIMING_SUCCESS,
        MetricRole::TimingFailure => ENV_CONSUMER_TIMING_FAILURE,
    }
}

/// Parsed env overrides; `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecstatEnv {
    /// `RECSTAT_CONSUMED_COUNTER`.
    pub consumed_counter: Option<Box<str>>,
    /// `RECSTAT_CONSUMER_SUCCESS_COUNTER`.
    pub consumer_success_counter: Option<Box<str>>,
    /// `RECSTAT_CONSUMER_ERROR_COUNTER`.
    pub consumer_error_counter: Option<Box<str>>,
    /// `RECSTAT_CONSUMED_SIZE`.
    pub consumed_size: Option<Box<str>>,
    /// `RECSTAT_CONSUMER_LAG`.
    pub consumer_lag: Option<Box<str>>,
    /// `RECSTAT_CONSUMER_TIMING_SUCCESS`.
    pub consumer_timing_success: Option<Box<str>>,
    /// `RECSTAT_CONSUMER_TIMING_FAILURE`.
    pub consumer_timing_failure: Option<Box<str>>,
}

impl RecstatEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        let mut env = Self::default();
        for role in MetricRole::ALL {
            *env.slot_mut(role) = parse_optional_trimmed_string(map, env_var_for(role))?;
        }
        Ok(env)
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in MetricRole::ALL.map(env_var_for) {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }

        Self::from_map(&map)
    }

    /// Override for `role`, if set.
    #[must_use]
    pub fn get(&self, role: MetricRole) -> Option<&str> {
        match role {
            MetricRole::Consumed => self.consumed_counter.as_deref(),
            MetricRole::Success => self.consumer_success_counter.as_deref(),
            MetricRole::Error => self.consumer_error_counter.as_deref(),
            MetricRole::ConsumedSize => self.consumed_size.as_deref(),
            MetricRole::Lag => self.consumer_lag.as_deref(),
            MetricRole::TimingSuccess => self.consumer_timing_success.as_deref(),
            MetricRole::TimingFailure => self.consumer_timing_failure.as_deref(),
        }
    }

    /// Returns true when no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        MetricRole::ALL.into_iter().all(|role| self.get(role).is_none())
    }

    const fn slot_mut(&mut self, role: MetricRole) -> &mut Option<Box<str>> {
        match role {
            MetricRole::Consumed => &mut self.consumed_counter,
            MetricRole::Success => &mut self.consumer_success_counter,
            MetricRole::Error => &mut self.consumer_error_counter,
            MetricRole::ConsumedSize => &mut self.consumed_size,
            MetricRole::Lag => &mut self.consumer_lag,
            MetricRole::TimingSuccess => &mut self.consumer_timing_success,
            MetricRole::TimingFailure => &mut self.consumer_timing_failure,
        }
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: RecstatConfig,
    env: &RecstatEnv,
) -> Result<ValidatedRecstatConfig, ErrorEnvelope> {
    let mut config = base;
    for role in MetricRole::ALL {
        if let Some(name) = env.get(role) {
            config.consumer_metrics.set(role, name);
        }
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Typed env parsing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// Variable is set but blank.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned().into_boxed_str()))
}
