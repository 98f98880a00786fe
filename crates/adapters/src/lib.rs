//! # recstat-adapters
//!
//! Adapter implementations for the telemetry port.
//! This crate depends on `ports` and `shared`.

pub mod aggregate;
pub mod fanout;
pub mod log_sink;
pub mod telemetry;

pub use aggregate::{AggregatingTelemetry, MetricsSnapshot, TimingSummary};
pub use fanout::FanoutTelemetry;
pub use log_sink::{LogSink, StdoutLogSink};
pub use telemetry::{JsonTelemetry, TaggedTelemetry};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
