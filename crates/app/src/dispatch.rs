//! Concurrent record dispatch.
//!
//! Records are handed to a synchronous `RecordProcessor` on tokio's blocking
//! pool, with at most `concurrency` in flight. Every record gets a child
//! scope carrying a fresh invocation correlation id.

use recstat_domain::StreamRecord;
use recstat_ports::RecordProcessor;
use recstat_shared::{CorrelationId, ErrorClass, ErrorCode, ErrorEnvelope, Result, Scope};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Maximum number of failures kept in a [`DispatchSummary`].
pub const MAX_REPORTED_FAILURES: usize = 20;

/// Default number of records processed at once.
pub const DEFAULT_DISPATCH_CONCURRENCY: usize = 4;

/// Dispatch tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Maximum number of records processed at once. Must be at least 1.
    pub concurrency: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_DISPATCH_CONCURRENCY,
        }
    }
}

/// One failed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchFailure {
    /// Sequence number of the failed record.
    pub sequence_number: String,
    /// Error code reported by the processor.
    pub code: String,
    /// Error message reported by the processor.
    pub message: String,
}

/// Outcome counts for one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    /// Records handed to the processor.
    pub processed: usize,
    /// Records the processor accepted.
    pub succeeded: usize,
    /// Records the processor rejected.
    pub failed: usize,
    /// First failures in input order, capped at [`MAX_REPORTED_FAILURES`].
    pub failures: Vec<DispatchFailure>,
}

impl DispatchSummary {
    fn record(&mut self, record: &StreamRecord, outcome: &Result<()>) {
        self.processed += 1;
        match outcome {
            Ok(()) => self.succeeded += 1,
            Err(error) => {
                self.failed += 1;
                if self.failures.len() < MAX_REPORTED_FAILURES {
                    self.failures.push(DispatchFailure {
                        sequence_number: record.sequence_number().as_str().to_owned(),
                        code: error.code.to_string(),
                        message: error.message.clone(),
                    });
                }
            },
        }
    }
}

/// Process `records` through `processor`, at most `options.concurrency` at a time.
///
/// Processor failures are counted, never returned. The call itself fails only
/// for invalid options or when a processing task cannot be joined.
#[tracing::instrument(
    name = "dispatch_records",
    skip_all,
    fields(records = records.len(), concurrency = options.concurrency)
)]
pub async fn dispatch_records(
    processor: Arc<dyn RecordProcessor>,
    scope: &Scope,
    records: Vec<StreamRecord>,
    options: DispatchOptions,
) -> Result<DispatchSummary> {
    if options.concurrency == 0 {
        return Err(
            ErrorEnvelope::expected(ErrorCode::invalid_input(), "concurrency must be at least 1")
                .with_metadata("concurrency", "0"),
        );
    }

    tracing::info!(batch = %scope.correlation_id(), "dispatching records");
    let semaphore = Arc::new(Semaphore::new(options.concurrency));
    let mut tasks = JoinSet::new();

    for (index, record) in records.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|error| dispatch_error(&format!("dispatch permit unavailable: {error}")))?;
        let processor = Arc::clone(&processor);
        let child = scope.with_correlation_id(CorrelationId::new_invocation_id());
        tasks.spawn_blocking(move || {
            let _permit = permit;
            let outcome = processor.process(&child, &record);
            (index, record, outcome)
        });
    }

    let mut completed = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let done =
            joined.map_err(|error| dispatch_error(&format!("dispatch task failed: {error}")))?;
        completed.push(done);
    }
    completed.sort_by_key(|(index, _, _)| *index);

    let mut summary = DispatchSummary::default();
    for (_, record, outcome) in &completed {
        if let Err(error) = outcome {
            tracing::warn!(
                sequence_number = %record.sequence_number(),
                code = %error.code,
                "record processing failed"
            );
        }
        summary.record(record, outcome);
    }

    tracing::info!(
        processed = summary.processed,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "dispatch complete"
    );
    Ok(summary)
}

fn dispatch_error(message: &str) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(ErrorCode::internal(), message, ErrorClass::NonRetriable)
}
