//! The `helios` binary: stdio compute worker and telemetry tool.

mod platform;
mod serve;
mod telemetry;

use std::process::ExitCode;

use clap::Parser;
use helios_config::{CliArgs, Command, Config, ConfigError};
use helios_telemetry::TelemetryError;
use helios_worker::ComputeError;
use tracing::{error, info};

use crate::platform::{PlatformDirs, PlatformError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Compute(#[from] ComputeError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "helios exited with an error");
            eprintln!("helios: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), AppError> {
    let dirs = match &args.config {
        Some(dir) => PlatformDirs::with_config_dir(dir),
        None => PlatformDirs::resolve()?,
    };
    dirs.create_dirs()?;

    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(&args);
    helios_log::init_logging(Some(&dirs.log_dir), config.debug.log_to_file, Some(&config));
    info!(
        config_dir = %dirs.config_dir.display(),
        version = env!("CARGO_PKG_VERSION"),
        "helios starting"
    );

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve::run(&config),
        Command::Telemetry { planet } => telemetry::run(&config, &planet),
    }
}
