//! Configuration management for the dispatch planner.
//!
//! Hierarchical configuration with discovery and precedence: CLI > file >
//! defaults. Supports TOML configuration files with `[catalog]`,
//! `[duration]`, `[nodes]`, `[filter]`, `[output]`, `[static_bindings]`, and
//! `[submit_overrides]` sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use model::{
    CatalogConfig, Config, ConfigSource, DurationConfig, FilterSettings, NodePoolConfig,
    OutputConfig, StaticBindingsConfig, SubmitOverridesConfig,
};
