//! # recstat-app
//!
//! Record processing decorators and the consumer pipeline built from them.
//! This crate depends on `ports`, `domain`, `config` and `shared`.

pub mod dispatch;
pub mod pipeline;
pub mod stat_binder;
pub mod stat_processor;

pub use dispatch::{
    DEFAULT_DISPATCH_CONCURRENCY, DispatchFailure, DispatchOptions, DispatchSummary,
    MAX_REPORTED_FAILURES, dispatch_records,
};
pub use pipeline::{ConsumerPipeline, ConsumerPipelineBuilder};
pub use stat_binder::{StatBinder, stat_binder_layer};
pub use stat_processor::{
    StatProcessor, StatProcessorComponent, stat_processor_layer, stat_processor_layer_with_clock,
};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
