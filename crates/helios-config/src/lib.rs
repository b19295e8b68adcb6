//! Configuration system for helios.
//!
//! Settings persist to disk as RON and can be overridden from the command line.
//! Unknown fields are ignored and missing fields fall back to defaults, so
//! older config files keep loading as new sections are added.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, Command};
pub use config::{
    Config, DebugConfig, EphemerisConfig, SchedulerConfig, TelemetryConfig, default_config_dir,
};
pub use error::ConfigError;
