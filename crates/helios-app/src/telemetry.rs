//! `helios telemetry <planet>`: live conditions at 1 AU scaled to a planet.

use std::io::Write;
use std::time::Duration;

use helios_config::Config;
use helios_telemetry::{ExoPlanet, ExoplanetTelemetryScaler, ScaledTelemetry, SolarWindFeed, SpaceWeather};
use serde::Serialize;
use tracing::info;

use crate::AppError;

#[derive(Debug, Serialize)]
pub struct TelemetryReport {
    pub earth: SpaceWeather,
    pub scaled: ScaledTelemetry,
}

impl TelemetryReport {
    pub fn build(planet: ExoPlanet, earth: SpaceWeather) -> Self {
        let wind = earth.solar_wind;
        let scaled = ExoplanetTelemetryScaler::scale(planet, wind.density, wind.speed, wind.bt);
        Self { earth, scaled }
    }
}

pub fn run(config: &Config, planet: &str) -> Result<(), AppError> {
    let planet: ExoPlanet = planet.parse()?;
    let feed = SolarWindFeed::http(
        &config.telemetry.solar_wind_url,
        &config.telemetry.kp_index_url,
        Duration::from_millis(config.telemetry.request_timeout_ms),
    );
    let report = TelemetryReport::build(planet, feed.fetch());
    info!(%planet, quality = ?report.earth.quality, "telemetry scaled");

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_scales_earth_conditions() {
        let report = TelemetryReport::build(ExoPlanet::Saturn, SpaceWeather::fallback());
        let r = ExoPlanet::Saturn.distance_au();
        assert!((report.scaled.conditions.density - 5.0 / (r * r)).abs() < 1e-12);
        assert_eq!(report.scaled.conditions.speed, 400.0);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["earth"]["quality"], "fallback");
        assert_eq!(value["scaled"]["planet"], "Saturn");
    }
}
