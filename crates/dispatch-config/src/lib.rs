//! Configuration model, file/CLI discovery, and validation for the dispatch
//! planner (`§6`).

pub mod config;

pub use config::{
    CatalogConfig, CliArgs, Config, ConfigBuilder, ConfigSource, DurationConfig, FilterSettings,
    NodePoolConfig, OutputConfig, StaticBindingsConfig, SubmitOverridesConfig,
};
