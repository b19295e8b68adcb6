//! Request dispatch: one tagged request in, one tagged response out.
//!
//! The router knows nothing about threads or channels, so every request
//! kind can be exercised directly.

use std::collections::BTreeMap;
use std::sync::Arc;

use helios_ephemeris::moon::moon_position;
use helios_ephemeris::{
    AnalyticEphemerisModel, BodyId, EphemerisError, HeliocentricVector, Observer,
    PrecisionEphemerisResolver, RiseSet, SceneVector, Timestamp, moon_phase, search_rise_set,
    to_scene,
};
use tracing::{debug, warn};

use crate::error::ComputeError;
use crate::protocol::{Request, Response};

/// Rise/set search window in days.
pub const RISE_SET_WINDOW_DAYS: f64 = 1.0;

/// Remote lookups: the shared resolver plus the runtime that drives it.
#[derive(Clone)]
pub struct PrecisionBackend {
    pub resolver: Arc<PrecisionEphemerisResolver>,
    pub runtime: tokio::runtime::Handle,
}

#[derive(Clone, Default)]
pub struct Router {
    precision: Option<PrecisionBackend>,
}

impl Router {
    /// Router that answers `JPL_QUERY` from the analytic model.
    pub fn analytic_only() -> Self {
        Self { precision: None }
    }

    pub fn with_precision(backend: PrecisionBackend) -> Self {
        Self {
            precision: Some(backend),
        }
    }

    pub fn precision_enabled(&self) -> bool {
        self.precision.is_some()
    }

    /// Handle one request.
    ///
    /// Must not be called from inside an async runtime when precision is
    /// enabled: `JPL_QUERY` blocks on the backend runtime.
    pub fn route(&self, request: &Request) -> Result<Response, ComputeError> {
        match request {
            Request::ComputePositions { date, bodies } => {
                Ok(compute_positions(Timestamp::from_millis(*date), bodies))
            }
            Request::ComputeMoonPhases { date } => {
                let phase = moon_phase(Timestamp::from_millis(*date));
                if !phase.phase.is_finite() || !phase.illumination.is_finite() {
                    return Err(ComputeError::NonFinite("moon phase"));
                }
                Ok(Response::MoonPhaseResult {
                    phase: phase.phase,
                    illumination: phase.illumination,
                })
            }
            Request::ComputeRiseSet {
                date,
                lat,
                lon,
                body,
            } => compute_rise_set(Timestamp::from_millis(*date), *lat, *lon, body),
            Request::JplQuery { date, body } => {
                Ok(self.precise_position(Timestamp::from_millis(*date), body))
            }
        }
    }

    fn precise_position(&self, time: Timestamp, name: &str) -> Response {
        let position = match name.parse::<BodyId>() {
            Ok(body) => match &self.precision {
                // Sun and Moon have no remote id; keep their analytic placement.
                Some(backend) if body.horizons_id().is_some() => {
                    let resolver = Arc::clone(&backend.resolver);
                    let vector = backend.runtime.block_on(resolver.resolve(body, time));
                    to_scene(&vector)
                }
                _ => scene_position(body, time),
            },
            Err(err) => {
                warn!(body = name, error = %err, "unknown body in precision query, using origin");
                SceneVector::ORIGIN
            }
        };
        Response::JplResult {
            body: name.to_string(),
            position: position.to_array(),
        }
    }
}

/// Heliocentric position for any known body. The Sun sits at the origin;
/// the Moon is Earth plus its geocentric offset.
pub fn heliocentric_position(
    body: BodyId,
    time: Timestamp,
) -> Result<HeliocentricVector, EphemerisError> {
    match body {
        BodyId::Sun => Ok(HeliocentricVector::ORIGIN),
        BodyId::Moon => {
            let earth = AnalyticEphemerisModel::position(BodyId::Earth, time)?;
            Ok(HeliocentricVector {
                position: earth.position + moon_position(time).to_vector(),
                velocity: None,
            })
        }
        other => AnalyticEphemerisModel::position(other, time),
    }
}

/// Scene position, degrading to the origin.
fn scene_position(body: BodyId, time: Timestamp) -> SceneVector {
    match heliocentric_position(body, time) {
        Ok(vector) => to_scene(&vector),
        Err(err) => {
            debug!(%body, error = %err, "no analytic position, using origin");
            SceneVector::ORIGIN
        }
    }
}

/// Batch positions. A bad name yields the origin for that entry only.
pub fn compute_positions(time: Timestamp, bodies: &[String]) -> Response {
    let mut positions = BTreeMap::new();
    for name in bodies {
        let position = match name.parse::<BodyId>() {
            Ok(body) => scene_position(body, time),
            Err(err) => {
                warn!(body = %name, error = %err, "unknown body in batch, using origin");
                SceneVector::ORIGIN
            }
        };
        positions.insert(name.clone(), position.to_array());
    }
    Response::PositionsResult { positions }
}

fn compute_rise_set(
    time: Timestamp,
    lat: f64,
    lon: f64,
    name: &str,
) -> Result<Response, ComputeError> {
    let observer = Observer::new(lat, lon)?;
    let events = match name.parse::<BodyId>() {
        Ok(body) => search_rise_set(body, observer, time, RISE_SET_WINDOW_DAYS)?,
        Err(_) => {
            debug!(body = name, "unknown body in rise/set query");
            RiseSet::default()
        }
    };
    Ok(Response::RiseSetResult {
        body: name.to_string(),
        rise: events.rise.map(Timestamp::to_iso8601).transpose()?,
        set: events.set.map(Timestamp::to_iso8601).transpose()?,
    })
}
