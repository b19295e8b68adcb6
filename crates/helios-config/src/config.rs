//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";
const APP_NAME: &str = "helios";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Local and remote ephemeris settings.
    pub ephemeris: EphemerisConfig,
    /// Off-thread compute scheduler settings.
    pub scheduler: SchedulerConfig,
    /// Live solar-wind feed settings.
    pub telemetry: TelemetryConfig,
    /// Logging/development settings.
    pub debug: DebugConfig,
}

/// Ephemeris resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EphemerisConfig {
    /// Horizons REST endpoint.
    pub horizons_url: String,
    /// Hard timeout for one Horizons request, in milliseconds.
    pub request_timeout_ms: u64,
    /// Width of a cache bucket and lifetime of a cache entry, in seconds.
    pub cache_ttl_secs: u64,
    /// Query Horizons for single-body precision requests.
    pub precision_enabled: bool,
}

/// Compute scheduler settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Worker thread count. `0` derives a count from available cores.
    pub worker_count: usize,
    /// Maximum queued requests before `submit` starts rejecting.
    pub queue_capacity: usize,
}

/// Solar-wind telemetry feed settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Real-time solar wind plasma/magnetometer JSON.
    pub solar_wind_url: String,
    /// One-minute planetary Kp JSON.
    pub kp_index_url: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter directive (e.g., "debug", "info,helios_worker=trace").
    pub log_level: String,
    /// Also write JSON logs to the platform log directory.
    pub log_to_file: bool,
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            horizons_url: "https://ssd.jpl.nasa.gov/api/horizons.api".to_string(),
            request_timeout_ms: 8_000,
            cache_ttl_secs: 15 * 60,
            precision_enabled: true,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_count: 0,
            queue_capacity: 64,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            solar_wind_url: "https://services.swpc.noaa.gov/json/rtsw/rtsw_wind_1m.json"
                .to_string(),
            kp_index_url: "https://services.swpc.noaa.gov/json/planetary_k_index_1m.json"
                .to_string(),
            request_timeout_ms: 8_000,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// The per-user directory holding `config.ron`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::WriteError {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::WriteError {
            path: config_path.clone(),
            source,
        })
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(2))
                .unwrap();
        assert!(ron_str.contains("request_timeout_ms: 8000"));
        assert!(ron_str.contains("cache_ttl_secs: 900"));
    }

    #[test]
    fn test_defaults_match_resolver_contract() {
        let eph = EphemerisConfig::default();
        assert_eq!(eph.request_timeout_ms, 8_000);
        assert_eq!(eph.cache_ttl_secs, 900);
        assert!(eph.precision_enabled);
        assert!(eph.horizons_url.ends_with("horizons.api"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(ephemeris: (precision_enabled: false))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert!(!config.ephemeris.precision_enabled);
        assert_eq!(config.ephemeris.cache_ttl_secs, 900);
        assert_eq!(config.scheduler, SchedulerConfig::default());
        assert_eq!(config.telemetry, TelemetryConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.scheduler.worker_count = 6;
        config.ephemeris.horizons_url = "http://127.0.0.1:9/horizons".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_file_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.debug.log_level = "trace".to_string();
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().debug.log_level, "trace");
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
