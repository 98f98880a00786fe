//! Config loading helpers (env + file).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{RecstatConfig, RecstatEnv, ValidatedRecstatConfig, apply_env_overrides};
use recstat_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Load the config from sources using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`RecstatEnv`)
/// - config JSON (file content)
/// - defaults (`RecstatConfig::default()`)
pub fn load_recstat_config_from_sources(
    config_json: Option<&str>,
    env: &RecstatEnv,
) -> Result<ValidatedRecstatConfig, ErrorEnvelope> {
    let config = match config_json {
        None => RecstatConfig::default(),
        Some(input) => parse_config_unvalidated(input, ConfigFormat::Json)?,
    };

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the config from an optional file path (`.json` or `.toml`).
pub fn load_recstat_config_from_path(
    config_path: Option<&Path>,
    env: &RecstatEnv,
) -> Result<ValidatedRecstatConfig, ErrorEnvelope> {
    let config = match config_path {
        None => RecstatConfig::default(),
        Some(path) => {
            let config_text = read_config_file(path)?;
            let format = detect_config_format(path)?;
            parse_config_unvalidated(&config_text, format)?
        },
    };

    apply_env_overrides(config, env)
}

/// Load the config from std env and an optional file path.
pub fn load_recstat_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedRecstatConfig, ErrorEnvelope> {
    let env = RecstatEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_recstat_config_from_path(config_path, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &RecstatConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &RecstatConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<RecstatConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_wins_over_config_file() -> Result<(), Box<dyn std::error::Error>> {
        let config_json = r#"{
          "version": 1,
          "consumerMetrics": { "consumed-counter": "file.consumed" }
        }"#;

        let env = RecstatEnv {
            consumed_counter: Some("env.consumed".into()),
            ..RecstatEnv::default()
        };

        let config = load_recstat_config_from_sources(Some(config_json), &env)?;
        assert_eq!(config.names().consumed(), "env.consumed");
        Ok(())
    }

    #[test]
    fn file_wins_over_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let config_json = r#"{ "consumerMetrics": { "consumed-size": "file.size" } }"#;

        let config = load_recstat_config_from_sources(Some(config_json), &RecstatEnv::default())?;
        assert_eq!(config.names().consumed_size(), "file.size");
        assert_eq!(config.names().lag(), "kinesis.consumer_lag.timing");
        Ok(())
    }

    #[test]
    fn serialization_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_recstat_config_from_sources(None, &RecstatEnv::default())?;
        let first = to_pretty_json(&config)?;
        let second = to_pretty_json(&config)?;
        assert_eq!(first, second);
        assert!(first.contains("\"consumer-timing-failure\""));
        Ok(())
    }

    #[test]
    fn toml_output_uses_section_name() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_recstat_config_from_sources(None, &RecstatEnv::default())?;
        let rendered = to_pretty_toml(&config)?;
        assert!(rendered.contains("[consumerMetrics]"));
        assert!(rendered.contains("consumed-counter = \"kinesis.consumed\""));
        Ok(())
    }

    #[test]
    fn invalid_file_name_is_overridden_by_valid_env() -> Result<(), Box<dyn std::error::Error>> {
        let config_json = r#"{ "consumerMetrics": { "consumer-lag": "bad lag" } }"#;
        let env = RecstatEnv {
            consumer_lag: Some("good.lag".into()),
            ..RecstatEnv::default()
        };

        // env overrides the invalid file value before validation runs
        let config = load_recstat_config_from_sources(Some(config_json), &env)?;
        assert_eq!(config.names().lag(), "good.lag");
        Ok(())
    }

    #[test]
    fn malformed_json_reports_source() -> Result<(), Box<dyn std::error::Error>> {
        let result =
            load_recstat_config_from_sources(Some("{ \"version\": }"), &RecstatEnv::default());

        let error = result
            .err()
            .ok_or_else(|| std::io::Error::other("expected parse error"))?;
        assert_eq!(error.code, ErrorCode::new("config", "invalid_json"));
        assert_eq!(
            error.metadata.get("source").map(String::as_str),
            Some("config")
        );
        Ok(())
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let error = load_recstat_config_from_path(
            Some(Path::new("recstat.yaml")),
            &RecstatEnv::default(),
        )
        .err();
        // The read fails first because the file does not exist.
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "config_file_not_found"))
        );
        assert!(detect_config_format(Path::new("recstat.yaml")).is_err());
        assert_eq!(
            detect_config_format(Path::new("recstat.TOML")).ok(),
            Some(ConfigFormat::Toml)
        );
    }
}
