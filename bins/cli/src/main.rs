//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand};
use commands::{EmitMode, ReplayCommandInput, run_config_show, run_replay};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use recstat_app::DEFAULT_DISPATCH_CONCURRENCY;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter (`tracing` directives).
const LOG_FILTER_ENV: &str = "RECSTAT_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Parser)]
#[command(
    name = "recstat",
    version,
    about = "Consumer-side metrics for stream records",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    /// Write diagnostics to stderr as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Replay recorded stream records through the metrics pipeline.
    Replay {
        /// JSON-lines file of records.
        #[arg(long)]
        input: PathBuf,
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Maximum number of records processed at once.
        #[arg(long, default_value_t = DEFAULT_DISPATCH_CONCURRENCY)]
        concurrency: usize,
        /// Fail records whose payload is not valid JSON.
        #[arg(long)]
        require_json: bool,
        /// Where metrics go.
        #[arg(long, value_enum, default_value_t = EmitMode::Summary)]
        emit: EmitMode,
        /// Tag added to every emitted metric (`key=value`, repeatable).
        #[arg(long = "tag", value_name = "KEY=VALUE")]
        tags: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective metric names.
    Show {
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    let mode = OutputMode::from_args(&cli.output);

    match run(&cli.command, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .try_init()
    };
    if let Err(error) = result {
        let _ = writeln!(io::stderr(), "warning: tracing already initialized: {error}");
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Show { config } => run_config_show(mode, config.as_deref()),
        },
        Commands::Replay {
            input,
            config,
            concurrency,
            require_json,
            emit,
            tags,
        } => run_replay(
            mode,
            &ReplayCommandInput {
                input,
                config: config.as_deref(),
                concurrency: *concurrency,
                require_json: *require_json,
                emit: *emit,
                tags,
            },
        ),
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    if !output.stdout.is_empty() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.stdout.as_bytes())?;
        stdout.flush()?;
    }
    if !output.stderr.is_empty() {
        io::stderr().write_all(output.stderr.as_bytes())?;
    }
    Ok(())
}
