//! JPL Horizons vector-table queries.
//!
//! Horizons answers `format=json` requests with an envelope whose `result`
//! string holds the human-readable report; the state vectors sit between the
//! `$$SOE` and `$$EOE` markers as CSV rows:
//! `JDTDB, Calendar Date, X, Y, Z, VX, VY, VZ,`.

use std::time::Duration;

use glam::DVec3;
use serde::Deserialize;

use crate::{EphemerisError, FetchError, HeliocentricVector, Timestamp};

const START_MARKER: &str = "$$SOE";
const END_MARKER: &str = "$$EOE";
const WINDOW_MS: i64 = 60_000;

/// One Horizons vectors request: a body and a one-minute window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorizonsQuery {
    pub command: String,
    pub start_time: String,
    pub stop_time: String,
}

impl HorizonsQuery {
    pub fn new(command: &str, time: Timestamp) -> Result<Self, EphemerisError> {
        Ok(Self {
            command: command.to_string(),
            start_time: time.horizons_format()?,
            stop_time: time.plus_millis(WINDOW_MS).horizons_format()?,
        })
    }

    /// Query-string parameters: heliocentric ecliptic vectors in AU and
    /// AU/day, CSV rows, no object summary.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("format", "json".to_string()),
            ("COMMAND", format!("'{}'", self.command)),
            ("CENTER", "'@sun'".to_string()),
            ("MAKE_EPHEM", "YES".to_string()),
            ("EPHEM_TYPE", "VECTORS".to_string()),
            ("VEC_TABLE", "2".to_string()),
            ("START_TIME", format!("'{}'", self.start_time)),
            ("STOP_TIME", format!("'{}'", self.stop_time)),
            ("STEP_SIZE", "'1m'".to_string()),
            ("VEC_CORR", "NONE".to_string()),
            ("OUT_UNITS", "AU-D".to_string()),
            ("VEC_LABELS", "NO".to_string()),
            ("VEC_DELTA_T", "NO".to_string()),
            ("CSV_FORMAT", "YES".to_string()),
            ("OBJ_DATA", "NO".to_string()),
        ]
    }
}

/// Blocking transport for Horizons requests, returning the raw response
/// body. The resolver runs it on the blocking pool and bounds it with its
/// own timeout, so implementations may block.
pub trait HorizonsTransport: Send + Sync {
    fn fetch(&self, query: &HorizonsQuery) -> Result<String, FetchError>;
}

/// [`HorizonsTransport`] over HTTPS with `ureq`.
pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl UreqTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("helios/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url.into(),
        }
    }
}

impl HorizonsTransport for UreqTransport {
    fn fetch(&self, query: &HorizonsQuery) -> Result<String, FetchError> {
        let mut request = self.agent.get(&self.base_url);
        for (key, value) in query.params() {
            request = request.query(key, &value);
        }
        match request.call() {
            Ok(response) => response
                .into_string()
                .map_err(|e| FetchError::Transport(e.to_string())),
            Err(ureq::Error::Status(code, _)) => Err(FetchError::Status(code)),
            Err(ureq::Error::Transport(e)) => Err(FetchError::Transport(e.to_string())),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    result: Option<String>,
    error: Option<String>,
}

/// Decode the JSON envelope and parse its vector table.
pub fn parse_response(body: &str) -> Result<HeliocentricVector, FetchError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if let Some(error) = envelope.error {
        return Err(FetchError::Remote(error));
    }
    parse_vector_table(envelope.result.as_deref().unwrap_or_default())
}

/// Parse the first data row between `$$SOE` and `$$EOE`.
pub fn parse_vector_table(report: &str) -> Result<HeliocentricVector, FetchError> {
    let start = report.find(START_MARKER).ok_or(FetchError::MissingMarker)? + START_MARKER.len();
    let end = report[start..]
        .find(END_MARKER)
        .ok_or(FetchError::MissingMarker)?
        + start;

    let row = report[start..end]
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| FetchError::MalformedRow(String::new()))?;

    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() < 5 {
        return Err(FetchError::MalformedRow(row.to_string()));
    }
    let number = |idx: usize| -> Result<f64, FetchError> {
        fields[idx]
            .parse::<f64>()
            .map_err(|_| FetchError::MalformedRow(row.to_string()))
    };

    let position = DVec3::new(number(2)?, number(3)?, number(4)?);
    if !position.is_finite() {
        return Err(FetchError::NonFinite);
    }

    let velocity = match fields.get(5..8) {
        Some(v) if v.iter().all(|f| !f.is_empty()) => {
            let velocity = DVec3::new(number(5)?, number(6)?, number(7)?);
            if !velocity.is_finite() {
                return Err(FetchError::NonFinite);
            }
            Some(velocity)
        }
        _ => None,
    };

    Ok(HeliocentricVector { position, velocity })
}
