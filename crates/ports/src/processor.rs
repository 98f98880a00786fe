//! Record processing contract and layer composition.

use recstat_domain::StreamRecord;
use recstat_shared::{Result, Scope};
use std::fmt;
use std::sync::Arc;

/// Processes one stream record within a request scope.
///
/// Processors are stateless with respect to invocations and may be called
/// concurrently from several threads.
pub trait RecordProcessor: Send + Sync {
    /// Process `record`. A failure is returned to the caller untouched by
    /// decorating layers.
    fn process(&self, scope: &Scope, record: &StreamRecord) -> Result<()>;
}

impl<P> RecordProcessor for Arc<P>
where
    P: RecordProcessor + ?Sized,
{
    fn process(&self, scope: &Scope, record: &StreamRecord) -> Result<()> {
        (**self).process(scope, record)
    }
}

impl<P> RecordProcessor for Box<P>
where
    P: RecordProcessor + ?Sized,
{
    fn process(&self, scope: &Scope, record: &StreamRecord) -> Result<()> {
        (**self).process(scope, record)
    }
}

/// Adapts a closure into a terminal `RecordProcessor`.
pub struct ProcessorFn<F>(F);

impl<F> ProcessorFn<F>
where
    F: Fn(&Scope, &StreamRecord) -> Result<()> + Send + Sync,
{
    /// Wrap `function`.
    pub const fn new(function: F) -> Self {
        Self(function)
    }
}

impl<F> RecordProcessor for ProcessorFn<F>
where
    F: Fn(&Scope, &StreamRecord) -> Result<()> + Send + Sync,
{
    fn process(&self, scope: &Scope, record: &StreamRecord) -> Result<()> {
        (self.0)(scope, record)
    }
}

impl<F> fmt::Debug for ProcessorFn<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("ProcessorFn")
    }
}

/// Wraps a processor in a decorating processor.
pub type ProcessorLayer =
    Arc<dyn Fn(Arc<dyn RecordProcessor>) -> Arc<dyn RecordProcessor> + Send + Sync>;

/// Wrap `terminal` in `layers`; `layers[0]` becomes the outermost processor.
#[must_use]
pub fn apply_layers(
    terminal: Arc<dyn RecordProcessor>,
    layers: &[ProcessorLayer],
) -> Arc<dyn RecordProcessor> {
    layers
        .iter()
        .rev()
        .fold(terminal, |inner, layer| layer(inner))
}
