//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::Config;

/// helios command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "helios", about = "Solar-system ephemeris compute core")]
pub struct CliArgs {
    /// Log level filter (error, warn, info, debug, trace or a full directive).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Number of compute worker threads (0 = one per spare core).
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Disable the remote high-precision ephemeris lookup.
    #[arg(long, global = true)]
    pub no_precision: bool,

    /// Override the Horizons API endpoint.
    #[arg(long, global = true)]
    pub horizons_url: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What the binary should do after start-up.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Serve worker requests as JSON lines on stdin/stdout (default).
    Serve,
    /// Fetch live solar-wind data and scale it to a planet.
    Telemetry {
        /// Target planet (Mars, Jupiter, Saturn, Uranus).
        planet: String,
    },
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(workers) = args.workers {
            self.scheduler.worker_count = workers;
        }
        if args.no_precision {
            self.ephemeris.precision_enabled = false;
        }
        if let Some(ref url) = args.horizons_url {
            self.ephemeris.horizons_url = url.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> CliArgs {
        CliArgs {
            log_level: None,
            workers: None,
            no_precision: false,
            horizons_url: None,
            config: None,
            command: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            workers: Some(3),
            no_precision: true,
            log_level: Some("debug".to_string()),
            ..bare_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.scheduler.worker_count, 3);
        assert!(!config.ephemeris.precision_enabled);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.ephemeris.request_timeout_ms, 8_000);
        assert_eq!(config.scheduler.queue_capacity, 64);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&bare_args());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_telemetry_subcommand() {
        let args = CliArgs::parse_from(["helios", "--workers", "2", "telemetry", "Jupiter"]);
        assert_eq!(args.workers, Some(2));
        assert_eq!(
            args.command,
            Some(Command::Telemetry {
                planet: "Jupiter".to_string()
            })
        );
    }

    #[test]
    fn test_parse_defaults_to_no_subcommand() {
        let args = CliArgs::parse_from(["helios"]);
        assert!(args.command.is_none());
        assert!(!args.no_precision);
    }
}
