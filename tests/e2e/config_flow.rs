//! End-to-end tests for `recstat config show`.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../crates/testkit/fixtures")
        .join(relative)
}

fn command() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_recstat"));
    for (key, _) in std::env::vars() {
        if key.starts_with("RECSTAT_") {
            command.env_remove(key);
        }
    }
    command
}

fn run_cli(args: &[&str]) -> std::io::Result<Output> {
    command().args(args).output()
}

#[test]
fn config_show_prints_defaults_as_text() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli(&["config", "show"])?;
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("[consumerMetrics]\n"));
    assert!(stdout.contains("consumed-counter = kinesis.consumed\n"));
    assert!(stdout.contains("consumer-lag = kinesis.consumer_lag.timing\n"));
    Ok(())
}

#[test]
fn config_show_merges_file_and_env() -> Result<(), Box<dyn std::error::Error>> {
    let config = fixture("config/recstat-config.valid.json");
    let output = command()
        .args(["--output", "json", "config", "show", "--config"])
        .arg(&config)
        .env("RECSTAT_CONSUMER_SUCCESS_COUNTER", "orders.ok")
        .output()?;
    assert_eq!(output.status.code(), Some(0));

    let value: Value = serde_json::from_slice(&output.stdout)?;
    let names = &value["consumerMetrics"];
    assert_eq!(names["consumed-counter"], "orders.consumed");
    assert_eq!(names["consumer-lag"], "orders.lag");
    assert_eq!(names["consumer-success-counter"], "orders.ok");
    assert_eq!(names["consumer-error-counter"], "kinesis.consumer_error");
    Ok(())
}

#[test]
fn config_show_renders_toml() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli(&["--output", "toml", "config", "show"])?;
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("[consumerMetrics]"));
    assert!(stdout.contains("consumer-timing-failure = \"kinesis.consumer.timing.failure\""));
    Ok(())
}

#[test]
fn config_show_rejects_invalid_names() -> Result<(), Box<dyn std::error::Error>> {
    let config = fixture("config/recstat-config.invalid.json");
    let output = command()
        .args(["config", "show", "--config"])
        .arg(&config)
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("consumer-timing-failure"), "{stderr}");
    Ok(())
}

#[test]
fn config_show_rejects_blank_env_override() -> Result<(), Box<dyn std::error::Error>> {
    let output = command()
        .args(["config", "show"])
        .env("RECSTAT_CONSUMER_LAG", "  ")
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    Ok(())
}
