//! JSON telemetry adapter (counters and timings) and tag decoration.

use crate::log_sink::LogSink;
use recstat_ports::{SignedDuration, TelemetryPort, TelemetryTags};
use recstat_shared::redaction::{REDACTED, is_secret_key};
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Telemetry adapter that emits JSON lines.
///
/// Timings are written as signed whole microseconds with `"unit":"us"`.
#[derive(Clone)]
pub struct JsonTelemetry {
    sink: Arc<dyn LogSink>,
    base_tags: TelemetryTags,
}

impl JsonTelemetry {
    /// Create a telemetry adapter backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_tags: TelemetryTags::new(),
        }
    }

    /// Set base tags applied to every metric.
    #[must_use]
    pub fn with_base_tags(mut self, tags: TelemetryTags) -> Self {
        self.base_tags = tags;
        self
    }
}

impl TelemetryPort for JsonTelemetry {
    fn increment_counter(&self, name: &str, value: u64, tags: Option<&TelemetryTags>) {
        let tags = merge_tags(&self.base_tags, tags);
        let payload = metric_payload("counter", name, Value::from(value), None, &tags);
        self.sink.write_line(&payload);
    }

    fn record_timing(&self, name: &str, elapsed: SignedDuration, tags: Option<&TelemetryTags>) {
        let tags = merge_tags(&self.base_tags, tags);
        let micros = Value::from(saturating_micros(elapsed));
        let payload = metric_payload("timing", name, micros, Some("us"), &tags);
        self.sink.write_line(&payload);
    }

    fn copy_handle(&self) -> Arc<dyn TelemetryPort> {
        Arc::new(self.clone())
    }
}

/// Telemetry adapter that applies base tags to an inner telemetry sink.
#[derive(Clone)]
pub struct TaggedTelemetry {
    inner: Arc<dyn TelemetryPort>,
    tags: TelemetryTags,
}

impl TaggedTelemetry {
    /// Wrap a telemetry sink with base tags.
    #[must_use]
    pub fn new(inner: Arc<dyn TelemetryPort>, tags: TelemetryTags) -> Self {
        Self { inner, tags }
    }
}

impl TelemetryPort for TaggedTelemetry {
    fn increment_counter(&self, name: &str, value: u64, tags: Option<&TelemetryTags>) {
        let merged = merge_tags(&self.tags, tags);
        self.inner.increment_counter(name, value, Some(&merged));
    }

    fn record_timing(&self, name: &str, elapsed: SignedDuration, tags: Option<&TelemetryTags>) {
        let merged = merge_tags(&self.tags, tags);
        self.inner.record_timing(name, elapsed, Some(&merged));
    }

    fn copy_handle(&self) -> Arc<dyn TelemetryPort> {
        Arc::new(Self {
            inner: self.inner.copy_handle(),
            tags: self.tags.clone(),
        })
    }
}

/// Signed microseconds, saturated to the `i64` range.
pub(crate) fn saturating_micros(elapsed: SignedDuration) -> i64 {
    let micros = elapsed.as_micros();
    i64::try_from(micros).unwrap_or(if micros < 0 { i64::MIN } else { i64::MAX })
}

fn metric_payload(
    metric_type: &str,
    name: &str,
    value: Value,
    unit: Option<&str>,
    tags: &TelemetryTags,
) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert("type".to_string(), Value::String("metric".to_string()));
    payload.insert("timestampMs".to_string(), Value::from(now_epoch_ms()));
    payload.insert(
        "metricType".to_string(),
        Value::String(metric_type.to_string()),
    );
    payload.insert("name".to_string(), Value::String(name.to_string()));
    payload.insert("value".to_string(), value);
    if let Some(unit) = unit {
        payload.insert("unit".to_string(), Value::String(unit.to_string()));
    }
    if !tags.is_empty() {
        payload.insert("tags".to_string(), tags_to_json(tags));
    }
    to_line(payload)
}

fn to_line(payload: serde_json::Map<String, Value>) -> String {
    serde_json::to_string(&Value::Object(payload)).map_or_else(
        |_| {
            "{\"type\":\"metric\",\"metricType\":\"error\",\"name\":\"telemetry.serialize_failed\",\"value\":1}\n"
                .to_string()
        },
        |mut encoded| {
            encoded.push('\n');
            encoded
        },
    )
}

fn merge_tags(base: &TelemetryTags, extra: Option<&TelemetryTags>) -> TelemetryTags {
    if base.is_empty() && extra.is_none() {
        return TelemetryTags::new();
    }
    let mut merged = base.clone();
    if let Some(extra) = extra {
        for (key, value) in extra {
            merged.insert(key.clone(), value.clone());
        }
    }
    redact_tags(&mut merged);
    merged
}

fn tags_to_json(tags: &TelemetryTags) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in tags {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    Value::Object(map)
}

fn redact_tags(tags: &mut TelemetryTags) {
    for (key, value) in tags.iter_mut() {
        if is_secret_key(key) {
            *value = REDACTED.to_string().into_boxed_str();
        }
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::LogSink;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct MemorySink {
        lines: Mutex<Vec<String>>,
    }

    impl MemorySink {
        fn take(&self) -> Vec<String> {
            let mut guard = self.lines.lock().expect("memory sink lock");
            std::mem::take(&mut *guard)
        }
    }

    impl LogSink for MemorySink {
        fn write_line(&self, line: &str) {
            let mut guard = self.lines.lock().expect("memory sink lock");
            guard.push(line.to_string());
        }
    }

    fn parse_lines(lines: &[String]) -> Result<Vec<Value>, serde_json::Error> {
        lines
            .iter()
            .map(|line| serde_json::from_str(line.trim()))
            .collect()
    }

    #[test]
    fn telemetry_emits_counter_and_timing() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemorySink::default());
        let telemetry = JsonTelemetry::new(sink.clone());

        telemetry.increment_counter("test.counter", 2, None);
        telemetry.record_timing(
            "test.timing",
            SignedDuration::from_std(Duration::from_micros(1_500)),
            None,
        );

        let parsed = parse_lines(&sink.take())?;
        assert_eq!(parsed.len(), 2);

        assert_eq!(parsed[0]["type"], "metric");
        assert_eq!(parsed[0]["metricType"], "counter");
        assert_eq!(parsed[0]["name"], "test.counter");
        assert_eq!(parsed[0]["value"], 2);
        assert!(parsed[0].get("unit").is_none());
        assert!(parsed[0].get("tags").is_none());

        assert_eq!(parsed[1]["metricType"], "timing");
        assert_eq!(parsed[1]["value"], 1_500);
        assert_eq!(parsed[1]["unit"], "us");
        Ok(())
    }

    #[test]
    fn negative_timing_is_written_signed() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemorySink::default());
        let telemetry = JsonTelemetry::new(sink.clone());

        telemetry.record_timing(
            "lag",
            SignedDuration::negative(Duration::from_millis(3)),
            None,
        );

        let parsed = parse_lines(&sink.take())?;
        assert_eq!(parsed[0]["value"], -3_000);
        Ok(())
    }

    #[test]
    fn copies_share_sink_and_base_tags() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemorySink::default());
        let mut tags = TelemetryTags::new();
        tags.insert("stream".into(), "orders".into());
        tags.insert("apiToken".into(), "abc".into());
        let telemetry = JsonTelemetry::new(sink.clone()).with_base_tags(tags);

        telemetry.copy_handle().increment_counter("c", 1, None);

        let parsed = parse_lines(&sink.take())?;
        assert_eq!(parsed[0]["tags"]["stream"], "orders");
        assert_eq!(parsed[0]["tags"]["apiToken"], REDACTED);
        Ok(())
    }

    #[test]
    fn key_named_tags_are_not_redacted() -> Result<(), Box<dyn std::error::Error>> {
        let sink = Arc::new(MemorySink::default());
        let mut tags = TelemetryTags::new();
        tags.insert("partition_key".into(), "shard-1".into());
        tags.insert("shard_key".into(), "7".into());
        tags.insert("api_key".into(), "abc".into());
        let telemetry = JsonTelemetry::new(sink.clone());

        telemetry.increment_counter("c", 1, Some(&tags));

        let parsed = parse_lines(&sink.take())?;
        assert_eq!(parsed[0]["tags"]["partition_key"], "shard-1");
        assert_eq!(parsed[0]["tags"]["shard_key"], "7");
        assert_eq!(parsed[0]["tags"]["api_key"], REDACTED);
        Ok(())
    }

    #[test]
    fn tagged_telemetry_merges_correlation_tag() {
        #[derive(Default)]
        struct Captured {
            tags: Mutex<Option<TelemetryTags>>,
            copies: Mutex<usize>,
        }

        #[derive(Clone)]
        struct CaptureTelemetry(Arc<Captured>);

        impl TelemetryPort for CaptureTelemetry {
            fn increment_counter(&self, _name: &str, _value: u64, tags: Option<&TelemetryTags>) {
                let mut guard = self.0.tags.lock().expect("tags lock");
                *guard = tags.cloned();
            }

            fn record_timing(&self, _: &str, _: SignedDuration, tags: Option<&TelemetryTags>) {
                let mut guard = self.0.tags.lock().expect("tags lock");
                *guard = tags.cloned();
            }

            fn copy_handle(&self) -> Arc<dyn TelemetryPort> {
                *self.0.copies.lock().expect("copies lock") += 1;
                Arc::new(self.clone())
            }
        }

        let captured = Arc::new(Captured::default());
        let mut tags = TelemetryTags::new();
        tags.insert(
            "correlationId".to_owned().into_boxed_str(),
            "req_456".to_owned().into_boxed_str(),
        );
        let telemetry =
            TaggedTelemetry::new(Arc::new(CaptureTelemetry(Arc::clone(&captured))), tags);
        telemetry
            .copy_handle()
            .record_timing("timing", SignedDuration::ZERO, None);

        let seen = captured.tags.lock().expect("tags lock").clone();
        let seen = seen.expect("tags missing");
        assert_eq!(
            seen.get("correlationId").map(|value| value.as_ref()),
            Some("req_456")
        );
        assert_eq!(*captured.copies.lock().expect("copies lock"), 1);
    }
}
