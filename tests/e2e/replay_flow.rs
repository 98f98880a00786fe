//! End-to-end tests for `recstat replay`.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from("../.."))
}

fn fixture(relative: &str) -> PathBuf {
    workspace_root()
        .join("crates/testkit/fixtures")
        .join(relative)
}

fn run_cli(args: &[&str]) -> std::io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_recstat"));
    command.args(args);
    for (key, _) in std::env::vars() {
        if key.starts_with("RECSTAT_") {
            command.env_remove(key);
        }
    }
    command.output()
}

fn valid_records() -> String {
    fixture("records/records.valid.jsonl")
        .to_string_lossy()
        .into_owned()
}

#[test]
fn replay_summary_counts_every_record() -> Result<(), Box<dyn std::error::Error>> {
    let input = valid_records();
    let output = run_cli(&["--output", "json", "replay", "--input", &input])?;
    assert_eq!(output.status.code(), Some(0));

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["dispatch"]["processed"], 4);
    assert_eq!(report["dispatch"]["failed"], 0);
    let counters = &report["metrics"]["counters"];
    assert_eq!(counters["kinesis.consumed"], 4);
    assert_eq!(counters["kinesis.consumer_success"], 4);
    assert_eq!(counters["kinesis.consumed_size"], 112);
    assert_eq!(
        report["metrics"]["timings"]["kinesis.consumer_lag.timing"]["count"],
        4
    );
    Ok(())
}

#[test]
fn replay_require_json_fails_non_json_records_without_failing_the_command()
-> Result<(), Box<dyn std::error::Error>> {
    let input = valid_records();
    let output = run_cli(&[
        "--output",
        "json",
        "replay",
        "--input",
        &input,
        "--require-json",
        "--concurrency",
        "2",
    ])?;
    assert_eq!(output.status.code(), Some(0));

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["dispatch"]["failed"], 2);
    assert_eq!(report["dispatch"]["failures"][0]["sequenceNumber"], "12347");
    assert_eq!(report["dispatch"]["failures"][1]["sequenceNumber"], "12348");
    let counters = &report["metrics"]["counters"];
    assert_eq!(counters["kinesis.consumer_error"], 2);
    assert_eq!(counters["kinesis.consumer_success"], 2);
    assert_eq!(
        report["metrics"]["timings"]["kinesis.consumer.timing.failure"]["count"],
        2
    );
    Ok(())
}

#[test]
fn replay_lines_emits_five_metric_lines_per_record() -> Result<(), Box<dyn std::error::Error>> {
    let input = valid_records();
    let output = run_cli(&[
        "replay",
        "--input",
        &input,
        "--emit",
        "lines",
        "--tag",
        "shard=shardId-000",
    ])?;
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<Value> = stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(lines.len(), 20);
    assert!(lines.iter().all(|line| line["type"] == "metric"));
    assert!(lines.iter().all(|line| line["tags"]["shard"] == "shardId-000"));
    let timings = lines
        .iter()
        .filter(|line| line["metricType"] == "timing")
        .count();
    assert_eq!(timings, 8);
    Ok(())
}

#[test]
fn replay_uses_configured_names() -> Result<(), Box<dyn std::error::Error>> {
    let input = valid_records();
    let config = fixture("config/recstat-config.valid.json");
    let config = config.to_string_lossy();
    let output = run_cli(&[
        "--output", "json", "replay", "--input", &input, "--config", &config,
    ])?;
    assert_eq!(output.status.code(), Some(0));

    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["metrics"]["counters"]["orders.consumed"], 4);
    assert_eq!(report["metrics"]["timings"]["orders.lag"]["count"], 4);
    assert!(report["metrics"]["counters"]["kinesis.consumed"].is_null());
    Ok(())
}

#[test]
fn replay_rejects_malformed_input() -> Result<(), Box<dyn std::error::Error>> {
    let input = fixture("records/records.invalid.jsonl");
    let input = input.to_string_lossy();
    let output = run_cli(&["replay", "--input", &input])?;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("line 2"), "{stderr}");
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn replay_rejects_zero_concurrency() -> Result<(), Box<dyn std::error::Error>> {
    let input = valid_records();
    let output = run_cli(&["replay", "--input", &input, "--concurrency", "0"])?;
    assert_eq!(output.status.code(), Some(2));
    Ok(())
}

#[test]
fn replay_missing_input_is_an_io_error() -> Result<(), Box<dyn std::error::Error>> {
    let missing = workspace_root().join("does-not-exist.jsonl");
    let missing = missing.to_string_lossy();
    let output = run_cli(&["replay", "--input", &missing])?;
    assert_eq!(output.status.code(), Some(3));
    Ok(())
}
