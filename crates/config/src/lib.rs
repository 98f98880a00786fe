//! # recstat-config
//!
//! Configuration schema, validation, and normalization logic for the CLI.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigSchemaError, MetricNamesConfig, RecstatConfig,
    ValidatedRecstatConfig, parse_recstat_config_json, parse_recstat_config_toml,
};

pub use env::{EnvParseError, RecstatEnv, apply_env_overrides, env_var_for};
pub use load::{
    load_recstat_config_from_path, load_recstat_config_from_sources, load_recstat_config_std_env,
    to_pretty_json, to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
