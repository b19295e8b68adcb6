//! Structured logging for helios.
//!
//! Installs a `tracing` subscriber that writes human-readable events to stderr
//! (stdout is reserved for the worker protocol) and, when requested, JSON
//! events to a file for post-mortem analysis. The filter comes from `RUST_LOG`
//! when set, otherwise from the config's `debug.log_level`.

use helios_config::Config;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Noise suppression appended to every configured level.
const QUIET_DEPENDENCIES: &str = "ureq=warn,rustls=warn";

/// Name of the JSON log file created inside `log_dir`.
pub const LOG_FILE_NAME: &str = "helios.log";

/// Build the filter directive from an optional config.
///
/// An empty `log_level` falls back to `info`.
pub fn filter_directive(config: Option<&Config>) -> String {
    let level = config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or("info");
    format!("{level},{QUIET_DEPENDENCIES}")
}

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file
/// * `file_logging` - whether to add the JSON file layer at all
/// * `config` - optional configuration supplying the level filter
///
/// Calling this twice in one process panics inside `tracing-subscriber`;
/// binaries call it once at start-up.
pub fn init_logging(log_dir: Option<&Path>, file_logging: bool, config: Option<&Config>) {
    let directive = filter_directive(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true) // worker threads are named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if file_logging
        && let Some(log_dir) = log_dir
        && let Ok(log_file) = open_log_file(log_dir)
    {
        subscriber.with(json_file_layer(log_file)).init();
        return;
    }

    subscriber.init();
}

/// Create `log_dir` if needed and truncate its log file.
fn open_log_file(log_dir: &Path) -> std::io::Result<File> {
    std::fs::create_dir_all(log_dir)?;
    File::create(log_dir.join(LOG_FILE_NAME))
}

/// One JSON object per event, no ANSI escapes.
fn json_file_layer<S>(log_file: File) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime())
        .json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        let directive = filter_directive(None);
        assert!(directive.starts_with("info,"));
        assert!(directive.contains("ureq=warn"));
    }

    #[test]
    fn test_directive_uses_config_level() {
        let mut config = Config::default();
        config.debug.log_level = "debug,helios_worker=trace".to_string();
        let directive = filter_directive(Some(&config));
        assert!(directive.starts_with("debug,helios_worker=trace,"));
    }

    #[test]
    fn test_blank_config_level_falls_back_to_info() {
        let mut config = Config::default();
        config.debug.log_level = "   ".to_string();
        assert!(filter_directive(Some(&config)).starts_with("info,"));
    }

    #[test]
    fn test_default_filter_renders() {
        let filter_str = EnvFilter::new(filter_directive(None)).to_string();
        assert!(filter_str.contains("ureq=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_subsystem_filters_parse() {
        for filter_str in [
            "info",
            "debug,helios_ephemeris=trace",
            "warn,helios_worker=debug,helios_telemetry=trace",
        ] {
            assert!(
                EnvFilter::try_new(filter_str).is_ok(),
                "Failed to parse filter: {filter_str}"
            );
        }
    }

    #[test]
    fn test_file_layer_writes_json_events() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("nested").join("logs");
        let log_file = open_log_file(&log_dir).unwrap();

        let subscriber = tracing_subscriber::registry().with(json_file_layer(log_file));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(body = "Mars", "precision lookup failed");
        });

        let contents = std::fs::read_to_string(log_dir.join(LOG_FILE_NAME)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["level"], "WARN");
        assert_eq!(event["fields"]["message"], "precision lookup failed");
        assert_eq!(event["fields"]["body"], "Mars");
        assert!(!lines[0].contains('\u{1b}'));
    }
}
