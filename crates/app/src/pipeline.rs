//! Consumer pipeline assembly.
//!
//! The assembled chain is always `StatBinder -> StatProcessor -> extra layers
//! -> terminal`, so the decorator always finds a bound sink.

use crate::stat_binder::stat_binder_layer;
use crate::stat_processor::stat_processor_layer_with_clock;
use recstat_domain::MetricNameSet;
use recstat_ports::{
    ClockPort, ProcessorLayer, RecordProcessor, SystemClock, TelemetryPort, apply_layers,
};
use std::sync::Arc;

/// Namespace for building consumer pipelines.
#[derive(Debug, Clone, Copy)]
pub struct ConsumerPipeline;

impl ConsumerPipeline {
    /// Start a pipeline that emits to copies of `sink`.
    #[must_use]
    pub fn builder(sink: Arc<dyn TelemetryPort>) -> ConsumerPipelineBuilder {
        ConsumerPipelineBuilder {
            sink,
            names: Arc::new(MetricNameSet::default()),
            clock: Arc::new(SystemClock),
            layers: Vec::new(),
        }
    }
}

/// Builder for the consumer processing chain.
pub struct ConsumerPipelineBuilder {
    sink: Arc<dyn TelemetryPort>,
    names: Arc<MetricNameSet>,
    clock: Arc<dyn ClockPort>,
    layers: Vec<ProcessorLayer>,
}

impl ConsumerPipelineBuilder {
    /// Metric names for the decorator (defaults otherwise).
    #[must_use]
    pub fn names(mut self, names: MetricNameSet) -> Self {
        self.names = Arc::new(names);
        self
    }

    /// Clock for lag and elapsed time (system clock otherwise).
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn ClockPort>) -> Self {
        self.clock = clock;
        self
    }

    /// Add a layer between the metrics decorator and the terminal processor.
    ///
    /// Layers added first sit closest to the decorator.
    #[must_use]
    pub fn layer(mut self, layer: ProcessorLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Wrap `terminal` in the configured chain.
    pub fn build(self, terminal: Arc<dyn RecordProcessor>) -> Arc<dyn RecordProcessor> {
        let mut layers = Vec::with_capacity(self.layers.len() + 2);
        layers.push(stat_binder_layer(self.sink));
        layers.push(stat_processor_layer_with_clock(self.names, self.clock));
        layers.extend(self.layers);
        tracing::debug!(layers = layers.len(), "assembled consumer pipeline");
        apply_layers(terminal, &layers)
    }
}
