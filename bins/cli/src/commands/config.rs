//! `config show` handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputFormat, OutputMode};
use recstat_config::{
    ValidatedRecstatConfig, load_recstat_config_std_env, to_pretty_json, to_pretty_toml,
};
use recstat_domain::{METRIC_NAMES_CONFIG_ROOT, MetricRole};
use std::fmt::Write as _;
use std::path::Path;

/// Print the effective metric names (defaults, then file, then env).
pub fn run_config_show(mode: OutputMode, path: Option<&Path>) -> Result<CliOutput, CliError> {
    let config = load_recstat_config_std_env(path)?;
    let stdout = match mode.format {
        OutputFormat::Text => format_config_text(&config),
        OutputFormat::Json => to_pretty_json(config.as_ref())?,
        OutputFormat::Toml => to_pretty_toml(config.as_ref())?,
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_config_text(config: &ValidatedRecstatConfig) -> String {
    let names = config.names();
    let mut output = format!("[{METRIC_NAMES_CONFIG_ROOT}]\n");
    for role in MetricRole::ALL {
        let _ = writeln!(output, "{} = {}", role.option_key(), names.name(role).as_str());
    }
    output
}
