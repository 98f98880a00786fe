//! # recstat-domain
//!
//! Domain values for consumer-side stream metrics.
//!
//! - **Primitives** - `SequenceNumber`, `PartitionKey`
//! - **Records** - `StreamRecord`
//! - **Metric names** - `MetricRole`, `MetricName`, `MetricNameSet`
//! - **Timing** - `SignedDuration`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use recstat_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod metric_names;
pub mod primitives;
pub mod record;
pub mod timing;

pub use metric_names::{
    DEFAULT_CONSUMED_COUNTER, DEFAULT_CONSUMED_SIZE, DEFAULT_CONSUMER_ERROR_COUNTER,
    DEFAULT_CONSUMER_LAG, DEFAULT_CONSUMER_SUCCESS_COUNTER, DEFAULT_CONSUMER_TIMING_FAILURE,
    DEFAULT_CONSUMER_TIMING_SUCCESS, METRIC_NAMES_CONFIG_ROOT, MetricName, MetricNameSet,
    MetricRole,
};
pub use primitives::{MAX_METRIC_NAME_BYTES, PartitionKey, PrimitiveError, SequenceNumber};
pub use record::{StreamRecord, system_time_from_epoch_ms};
pub use timing::SignedDuration;

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        let version = domain_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn domain_depends_on_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
