//! Layered configuration for the command-line tool.
//!
//! Values resolve from built-in [`defaults`], an optional TOML [`file`],
//! `--set KEY=VALUE` overrides and finally explicit flags, and end up in the
//! core [`PipelineConfig`](repeatskmer::engine::config::PipelineConfig).

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

pub use builder::build_config;
pub use models::AppConfig;
