//! Output format helpers for CLI commands.

use clap::{Args, ValueEnum};

/// Output format choices for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text output.
    #[default]
    Text,
    /// Pretty-printed JSON output.
    Json,
    /// TOML output.
    Toml,
}

/// Output-related CLI flags.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format for command responses.
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,
}

/// Output mode derived from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputMode {
    pub format: OutputFormat,
}

impl OutputMode {
    /// Build output mode from CLI flags.
    #[must_use]
    pub fn from_args(args: &OutputArgs) -> Self {
        Self {
            format: args.output.unwrap_or_default(),
        }
    }
}
