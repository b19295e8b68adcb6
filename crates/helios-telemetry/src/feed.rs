//! Live near-Earth solar-wind and Kp telemetry from NOAA SWPC.
//!
//! Both endpoints return a JSON array of records, oldest first; only the
//! last record is used. Missing fields are filled from
//! [`SolarWindReading::default`] and a failed endpoint contributes its
//! defaults wholesale, so a [`SpaceWeather`] is always complete.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::TelemetryError;
use crate::storm::{StormLevel, estimate_dst};

/// Kp assumed when the index feed is unavailable.
pub const DEFAULT_KP: f64 = 2.0;

/// Solar-wind plasma and field at L1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarWindReading {
    /// Bulk speed, km/s.
    pub speed: f64,
    /// Proton density, particles/cm³.
    pub density: f64,
    /// Proton temperature, K.
    pub temperature: f64,
    /// IMF north-south component, nT.
    pub bz: f64,
    /// IMF magnitude, nT.
    pub bt: f64,
}

impl Default for SolarWindReading {
    fn default() -> Self {
        Self {
            speed: 400.0,
            density: 5.0,
            temperature: 100_000.0,
            bz: 0.0,
            bt: 5.0,
        }
    }
}

/// How much of a [`SpaceWeather`] came from the live feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    /// Every value is live.
    Live,
    /// Some values are defaults.
    Partial,
    /// Nothing could be fetched.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceWeather {
    pub solar_wind: SolarWindReading,
    pub kp_index: f64,
    pub storm_level: StormLevel,
    /// Estimated Dst, nT.
    pub dst_index: f64,
    /// `time_tag` of the solar-wind record, when live.
    pub timestamp: Option<String>,
    pub quality: DataQuality,
}

impl SpaceWeather {
    fn assemble(
        solar_wind: SolarWindReading,
        kp_index: f64,
        timestamp: Option<String>,
        quality: DataQuality,
    ) -> Self {
        Self {
            solar_wind,
            kp_index,
            storm_level: StormLevel::from_kp(kp_index),
            dst_index: estimate_dst(kp_index, solar_wind.bz),
            timestamp,
            quality,
        }
    }

    /// Complete record built only from defaults.
    pub fn fallback() -> Self {
        Self::assemble(SolarWindReading::default(), DEFAULT_KP, None, DataQuality::Fallback)
    }
}

/// Fetches a URL and returns its body.
pub trait TelemetryTransport: Send + Sync {
    fn get(&self, url: &str) -> Result<String, TelemetryError>;
}

pub struct UreqTelemetryTransport {
    agent: ureq::Agent,
}

impl UreqTelemetryTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl TelemetryTransport for UreqTelemetryTransport {
    fn get(&self, url: &str) -> Result<String, TelemetryError> {
        match self.agent.get(url).call() {
            Ok(response) => response
                .into_string()
                .map_err(|e| TelemetryError::Transport(e.to_string())),
            Err(ureq::Error::Status(code, _)) => Err(TelemetryError::Status(code)),
            Err(ureq::Error::Transport(e)) => Err(TelemetryError::Transport(e.to_string())),
        }
    }
}

/// Numeric field that may arrive as a number or a numeric string.
fn number(record: &Value, key: &str) -> Option<f64> {
    let value = match record.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn latest_record(body: &str) -> Result<Value, TelemetryError> {
    let records: Vec<Value> = serde_json::from_str(body)?;
    records.into_iter().last().ok_or(TelemetryError::EmptySeries)
}

/// Parsed solar-wind record plus whether every field was present.
struct ParsedWind {
    reading: SolarWindReading,
    complete: bool,
    timestamp: Option<String>,
}

fn parse_solar_wind(body: &str) -> Result<ParsedWind, TelemetryError> {
    let record = latest_record(body)?;
    let defaults = SolarWindReading::default();
    let mut complete = true;
    let mut field = |key: &str, default: f64| {
        number(&record, key).unwrap_or_else(|| {
            complete = false;
            default
        })
    };
    let reading = SolarWindReading {
        speed: field("wind_speed", defaults.speed),
        density: field("density", defaults.density),
        temperature: field("temperature", defaults.temperature),
        bz: field("bz", defaults.bz),
        bt: field("bt", defaults.bt),
    };
    let timestamp = record
        .get("time_tag")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(ParsedWind {
        reading,
        complete,
        timestamp,
    })
}

fn parse_kp(body: &str) -> Result<Option<f64>, TelemetryError> {
    Ok(number(&latest_record(body)?, "kp_index"))
}

/// Live space-weather source.
pub struct SolarWindFeed {
    transport: Arc<dyn TelemetryTransport>,
    solar_wind_url: String,
    kp_index_url: String,
}

impl SolarWindFeed {
    pub fn new(
        transport: Arc<dyn TelemetryTransport>,
        solar_wind_url: impl Into<String>,
        kp_index_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            solar_wind_url: solar_wind_url.into(),
            kp_index_url: kp_index_url.into(),
        }
    }

    /// Feed over HTTPS.
    pub fn http(solar_wind_url: impl Into<String>, kp_index_url: impl Into<String>, timeout: Duration) -> Self {
        Self::new(
            Arc::new(UreqTelemetryTransport::new(timeout)),
            solar_wind_url,
            kp_index_url,
        )
    }

    /// Latest conditions. Never fails; see [`SpaceWeather::quality`].
    pub fn fetch(&self) -> SpaceWeather {
        let wind = self
            .transport
            .get(&self.solar_wind_url)
            .and_then(|body| parse_solar_wind(&body))
            .inspect_err(|err| warn!(url = %self.solar_wind_url, error = %err, "solar wind fetch failed, using defaults"))
            .ok();
        let kp = self
            .transport
            .get(&self.kp_index_url)
            .and_then(|body| parse_kp(&body))
            .inspect_err(|err| warn!(url = %self.kp_index_url, error = %err, "Kp fetch failed, using default"))
            .ok();

        let quality = match (&wind, kp) {
            (None, None) => DataQuality::Fallback,
            (Some(w), Some(Some(_))) if w.complete => DataQuality::Live,
            _ => DataQuality::Partial,
        };
        let kp_index = kp.flatten().unwrap_or(DEFAULT_KP);
        let (reading, timestamp) = match wind {
            Some(w) => (w.reading, w.timestamp),
            None => (SolarWindReading::default(), None),
        };
        debug!(?quality, kp = kp_index, speed = reading.speed, "space weather updated");
        SpaceWeather::assemble(reading, kp_index, timestamp, quality)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    const WIND: &str = "https://example.test/wind";
    const KP: &str = "https://example.test/kp";

    /// Serves fixed bodies per URL; unknown URLs fail.
    struct FixedTransport(HashMap<&'static str, String>);

    impl TelemetryTransport for FixedTransport {
        fn get(&self, url: &str) -> Result<String, TelemetryError> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| TelemetryError::Transport("connection refused".into()))
        }
    }

    fn feed(routes: Vec<(&'static str, String)>) -> SolarWindFeed {
        SolarWindFeed::new(Arc::new(FixedTransport(routes.into_iter().collect())), WIND, KP)
    }

    fn wind_body() -> String {
        json!([
            { "time_tag": "2024-05-10T17:00:00", "wind_speed": 380.0, "density": 4.0, "temperature": 90000, "bz": 1.0, "bt": 4.0 },
            { "time_tag": "2024-05-10T17:01:00", "wind_speed": "712.5", "density": 21.3, "temperature": 450000, "bz": -18.2, "bt": 30.1 }
        ])
        .to_string()
    }

    #[test]
    fn test_live_feed() {
        let feed = feed(vec![
            (WIND, wind_body()),
            (KP, json!([{ "kp_index": 3 }, { "kp_index": 8 }]).to_string()),
        ]);
        let sw = feed.fetch();
        assert_eq!(sw.quality, DataQuality::Live);
        assert_eq!(sw.solar_wind.speed, 712.5);
        assert_eq!(sw.solar_wind.bz, -18.2);
        assert_eq!(sw.kp_index, 8.0);
        assert_eq!(sw.storm_level, StormLevel::Severe);
        assert!((sw.dst_index + 332.0).abs() < 1e-9);
        assert_eq!(sw.timestamp.as_deref(), Some("2024-05-10T17:01:00"));
    }

    #[test]
    fn test_everything_down() {
        let sw = feed(vec![]).fetch();
        assert_eq!(sw, SpaceWeather::fallback());
        assert_eq!(sw.solar_wind.speed, 400.0);
        assert_eq!(sw.solar_wind.density, 5.0);
        assert_eq!(sw.solar_wind.temperature, 100_000.0);
        assert_eq!(sw.solar_wind.bz, 0.0);
        assert_eq!(sw.kp_index, 2.0);
        assert_eq!(sw.storm_level, StormLevel::Quiet);
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let body = json!([{ "wind_speed": 500.0, "density": null, "bz": "n/a" }]).to_string();
        let sw = feed(vec![(WIND, body), (KP, json!([{ "kp_index": 4 }]).to_string())]).fetch();
        assert_eq!(sw.quality, DataQuality::Partial);
        assert_eq!(sw.solar_wind.speed, 500.0);
        assert_eq!(sw.solar_wind.density, 5.0);
        assert_eq!(sw.solar_wind.bz, 0.0);
        assert_eq!(sw.solar_wind.bt, 5.0);
        assert_eq!(sw.storm_level, StormLevel::Active);
    }

    #[test]
    fn test_one_source_down_is_partial() {
        let sw = feed(vec![(KP, "[]".to_string()), (WIND, wind_body())]).fetch();
        assert_eq!(sw.quality, DataQuality::Partial);
        assert_eq!(sw.kp_index, DEFAULT_KP);
        assert_eq!(sw.solar_wind.speed, 712.5);

        let sw = feed(vec![(WIND, "<html>".to_string()), (KP, json!([{ "kp_index": 5.33 }]).to_string())]).fetch();
        assert_eq!(sw.quality, DataQuality::Partial);
        assert_eq!(sw.solar_wind, SolarWindReading::default());
        assert_eq!(sw.kp_index, 5.33);
    }
}
