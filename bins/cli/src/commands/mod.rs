//! CLI command handlers.

pub mod config;
pub mod records;
pub mod replay;

pub use config::run_config_show;
pub use replay::{EmitMode, ReplayCommandInput, run_replay};
