//! `replay` handler: run recorded stream records through the consumer pipeline.

use crate::CliOutput;
use crate::commands::records::parse_records;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputFormat, OutputMode};
use clap::ValueEnum;
use recstat_adapters::{
    AggregatingTelemetry, FanoutTelemetry, JsonTelemetry, MetricsSnapshot, StdoutLogSink,
    TaggedTelemetry,
};
use recstat_app::{ConsumerPipeline, DispatchOptions, DispatchSummary, dispatch_records};
use recstat_config::load_recstat_config_std_env;
use recstat_domain::StreamRecord;
use recstat_ports::{RecordProcessor, TelemetryPort, TelemetryTags};
use recstat_shared::{CorrelationId, ErrorCode, ErrorEnvelope, Result, Scope};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

/// Where replay metrics go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EmitMode {
    /// One JSON line per emission on stdout, as it happens.
    Lines,
    /// Aggregated totals once every record is processed.
    #[default]
    Summary,
    /// Both of the above.
    Both,
}

impl EmitMode {
    const fn lines(self) -> bool {
        matches!(self, Self::Lines | Self::Both)
    }

    const fn summary(self) -> bool {
        matches!(self, Self::Summary | Self::Both)
    }
}

/// Parsed `replay` arguments.
#[derive(Debug)]
pub struct ReplayCommandInput<'a> {
    pub input: &'a Path,
    pub config: Option<&'a Path>,
    pub concurrency: usize,
    pub require_json: bool,
    pub emit: EmitMode,
    pub tags: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayReport {
    dispatch: DispatchSummary,
    metrics: MetricsSnapshot,
}

/// Terminal processor for replayed records.
///
/// Accepts every record, or only records whose payload parses as JSON.
#[derive(Debug, Clone, Copy)]
struct PayloadCheck {
    require_json: bool,
}

impl RecordProcessor for PayloadCheck {
    fn process(&self, _scope: &Scope, record: &StreamRecord) -> Result<()> {
        if !self.require_json {
            return Ok(());
        }
        serde_json::from_slice::<serde_json::Value>(record.payload())
            .map(|_| ())
            .map_err(|error| {
                ErrorEnvelope::expected(
                    ErrorCode::new("replay", "invalid_json"),
                    format!("payload is not valid JSON: {error}"),
                )
                .with_metadata("sequenceNumber", record.sequence_number().as_str())
            })
    }
}

/// Run the replay command.
pub fn run_replay(mode: OutputMode, input: &ReplayCommandInput<'_>) -> Result<CliOutput, CliError> {
    let config = load_recstat_config_std_env(input.config)?;
    let tags = parse_tags(input.tags)?;
    let text = std::fs::read_to_string(input.input)?;
    let records = parse_records(&text)?;

    let aggregate = AggregatingTelemetry::new();
    let sink = build_sink(input.emit, &aggregate, tags);
    let pipeline = ConsumerPipeline::builder(sink)
        .names(config.names().clone())
        .build(Arc::new(PayloadCheck {
            require_json: input.require_json,
        }));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let scope = Scope::new(CorrelationId::new_batch_id());
    let summary = runtime.block_on(dispatch_records(
        pipeline,
        &scope,
        records,
        DispatchOptions {
            concurrency: input.concurrency,
        },
    ))?;
    tracing::info!(
        batch = %scope.correlation_id(),
        processed = summary.processed,
        failed = summary.failed,
        "replay finished"
    );

    let stdout = if input.emit.summary() {
        let report = ReplayReport {
            dispatch: summary,
            metrics: aggregate.snapshot(),
        };
        format_report(mode, &report)?
    } else {
        String::new()
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn build_sink(
    emit: EmitMode,
    aggregate: &AggregatingTelemetry,
    tags: TelemetryTags,
) -> Arc<dyn TelemetryPort> {
    let mut sinks: Vec<Arc<dyn TelemetryPort>> = Vec::new();
    if emit.lines() {
        sinks.push(Arc::new(JsonTelemetry::new(Arc::new(StdoutLogSink))));
    }
    if emit.summary() {
        sinks.push(Arc::new(aggregate.clone()));
    }
    let sink: Arc<dyn TelemetryPort> = Arc::new(FanoutTelemetry::new(sinks));
    if tags.is_empty() {
        sink
    } else {
        Arc::new(TaggedTelemetry::new(sink, tags))
    }
}

fn parse_tags(raw: &[String]) -> Result<TelemetryTags, CliError> {
    let mut tags = TelemetryTags::new();
    for entry in raw {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(CliError::InvalidInput(format!(
                "tag `{entry}` must look like key=value"
            )));
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return Err(CliError::InvalidInput(format!(
                "tag `{entry}` needs a non-empty key and value"
            )));
        }
        tags.insert(key.into(), value.into());
    }
    Ok(tags)
}

fn format_report(mode: OutputMode, report: &ReplayReport) -> Result<String, CliError> {
    match mode.format {
        OutputFormat::Text => Ok(format_report_text(report)),
        OutputFormat::Json => {
            let mut output = serde_json::to_string_pretty(report)?;
            output.push('\n');
            Ok(output)
        },
        OutputFormat::Toml => toml::to_string_pretty(report)
            .map_err(|error| CliError::Serialization(error.to_string())),
    }
}

fn format_report_text(report: &ReplayReport) -> String {
    let dispatch = &report.dispatch;
    let mut output = format!(
        "processed: {}\nsucceeded: {}\nfailed: {}\n",
        dispatch.processed, dispatch.succeeded, dispatch.failed
    );
    for failure in &dispatch.failures {
        let _ = writeln!(
            output,
            "failure: {} {} {}",
            failure.sequence_number, failure.code, failure.message
        );
    }
    for (name, total) in &report.metrics.counters {
        let _ = writeln!(output, "counter {name} = {total}");
    }
    for (name, timing) in &report.metrics.timings {
        let _ = writeln!(
            output,
            "timing {name} count={} min_us={} max_us={} sum_us={}",
            timing.count, timing.min_us, timing.max_us, timing.sum_us
        );
    }
    output
}
