//! Rise and set times for an observer on Earth.
//!
//! Altitude is sampled every ten minutes across the search window; each
//! horizon crossing is then refined by bisection to the millisecond.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::moon::{moon_position, sun_position};
use crate::{AnalyticEphemerisModel, BodyId, EphemerisError, Timestamp};

/// Mean obliquity of the ecliptic at J2000, degrees.
pub const OBLIQUITY_J2000_DEG: f64 = 23.439_291_1;

const SAMPLE_STEP_MS: i64 = 10 * 60 * 1_000;
const BISECTION_STEPS: u32 = 20;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// A point on Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Geodetic latitude, degrees north.
    pub latitude: f64,
    /// Longitude, degrees east.
    pub longitude: f64,
}

impl Observer {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, EphemerisError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=360.0).contains(&longitude);
        if !valid {
            return Err(EphemerisError::InvalidObserver {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Next rise and set inside the search window. `None` means the event does
/// not happen in the window (circumpolar, never up, or unsupported body).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiseSet {
    pub rise: Option<Timestamp>,
    pub set: Option<Timestamp>,
}

/// Altitude of the body's centre at the moment it touches the horizon,
/// accounting for refraction, semi-diameter, and lunar parallax.
fn horizon_altitude_deg(body: BodyId) -> Option<f64> {
    match body {
        BodyId::Sun => Some(-0.8333),
        BodyId::Moon => Some(0.125),
        BodyId::Earth | BodyId::Pluto | BodyId::Iss => None,
        planet => AnalyticEphemerisModel::supports(planet).then_some(-0.5667),
    }
}

/// Geocentric ecliptic direction to the body (unnormalised).
fn geocentric_ecliptic(body: BodyId, time: Timestamp) -> Result<DVec3, EphemerisError> {
    match body {
        BodyId::Sun => Ok(sun_position(time).to_vector()),
        BodyId::Moon => Ok(moon_position(time).to_vector()),
        _ => {
            let earth = AnalyticEphemerisModel::position(BodyId::Earth, time)?;
            let target = AnalyticEphemerisModel::position(body, time)?;
            Ok(target.position - earth.position)
        }
    }
}

/// Right ascension and declination in radians.
fn equatorial(ecliptic: DVec3) -> (f64, f64) {
    let (sin_e, cos_e) = OBLIQUITY_J2000_DEG.to_radians().sin_cos();
    let x = ecliptic.x;
    let y = ecliptic.y * cos_e - ecliptic.z * sin_e;
    let z = ecliptic.y * sin_e + ecliptic.z * cos_e;
    let r = (x * x + y * y + z * z).sqrt();
    (y.atan2(x), (z / r).asin())
}

/// Topocentric altitude of the body in degrees (geocentric direction).
pub fn altitude_deg(
    body: BodyId,
    observer: Observer,
    time: Timestamp,
) -> Result<f64, EphemerisError> {
    let (ra, dec) = equatorial(geocentric_ecliptic(body, time)?);
    let lat = observer.latitude.to_radians();
    let hour_angle = time.gmst_radians() + observer.longitude.to_radians() - ra;
    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos();
    Ok(sin_alt.clamp(-1.0, 1.0).asin().to_degrees())
}

/// Find the next rise and set of `body` for `observer` within
/// `window_days` after `start`.
pub fn search_rise_set(
    body: BodyId,
    observer: Observer,
    start: Timestamp,
    window_days: f64,
) -> Result<RiseSet, EphemerisError> {
    let Some(horizon) = horizon_altitude_deg(body) else {
        return Ok(RiseSet::default());
    };
    let above = |t: Timestamp| -> Result<f64, EphemerisError> {
        Ok(altitude_deg(body, observer, t)? - horizon)
    };

    let window_ms = (window_days * MILLIS_PER_DAY as f64) as i64;
    let end = start.plus_millis(window_ms);
    let mut result = RiseSet::default();

    let mut prev_t = start;
    let mut prev_h = above(prev_t)?;
    while prev_t < end && (result.rise.is_none() || result.set.is_none()) {
        let t = prev_t.plus_millis(SAMPLE_STEP_MS).min(end);
        let h = above(t)?;
        if prev_h < 0.0 && h >= 0.0 && result.rise.is_none() {
            result.rise = Some(refine(&above, prev_t, t, true)?);
        } else if prev_h >= 0.0 && h < 0.0 && result.set.is_none() {
            result.set = Some(refine(&above, prev_t, t, false)?);
        }
        prev_t = t;
        prev_h = h;
    }
    Ok(result)
}

/// Bisect a bracketed horizon crossing.
fn refine<F>(
    above: &F,
    mut lo: Timestamp,
    mut hi: Timestamp,
    rising: bool,
) -> Result<Timestamp, EphemerisError>
where
    F: Fn(Timestamp) -> Result<f64, EphemerisError>,
{
    for _ in 0..BISECTION_STEPS {
        let mid = Timestamp::from_millis(lo.millis() + (hi.millis() - lo.millis()) / 2);
        if (above(mid)? >= 0.0) == rising {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-06-21 00:00:00 UTC
    const SOLSTICE_MIDNIGHT: i64 = 1_718_928_000_000;

    fn minutes_after_midnight(t: Timestamp) -> f64 {
        (t.millis() - SOLSTICE_MIDNIGHT) as f64 / 60_000.0
    }

    #[test]
    fn test_london_sunrise_and_sunset_at_solstice() {
        let london = Observer::new(51.5074, -0.1278).unwrap();
        let rs = search_rise_set(
            BodyId::Sun,
            london,
            Timestamp::from_millis(SOLSTICE_MIDNIGHT),
            1.0,
        )
        .unwrap();
        // 03:43 and 20:21 UTC.
        let rise = minutes_after_midnight(rs.rise.unwrap());
        let set = minutes_after_midnight(rs.set.unwrap());
        assert!((rise - 223.0).abs() < 6.0, "rise at {rise} min");
        assert!((set - 1221.0).abs() < 6.0, "set at {set} min");
    }

    #[test]
    fn test_midnight_sun_has_no_events() {
        let svalbard = Observer::new(78.2, 15.6).unwrap();
        let rs = search_rise_set(
            BodyId::Sun,
            svalbard,
            Timestamp::from_millis(SOLSTICE_MIDNIGHT),
            1.0,
        )
        .unwrap();
        assert_eq!(rs, RiseSet::default());
    }

    #[test]
    fn test_planet_rises_and_sets_at_equator() {
        let quito = Observer::new(0.0, -78.5).unwrap();
        let start = Timestamp::from_millis(SOLSTICE_MIDNIGHT);
        let rs = search_rise_set(BodyId::Jupiter, quito, start, 1.0).unwrap();
        let rise = rs.rise.unwrap();
        let set = rs.set.unwrap();
        assert!(rise > start && rise <= start.plus_millis(MILLIS_PER_DAY));
        assert!(set > start && set <= start.plus_millis(MILLIS_PER_DAY));
    }

    #[test]
    fn test_events_bracket_the_horizon() {
        let observer = Observer::new(40.0, -74.0).unwrap();
        let start = Timestamp::from_millis(SOLSTICE_MIDNIGHT);
        let rs = search_rise_set(BodyId::Moon, observer, start, 1.0).unwrap();
        for t in [rs.rise, rs.set].into_iter().flatten() {
            let h = altitude_deg(BodyId::Moon, observer, t).unwrap() - 0.125;
            assert!(h.abs() < 0.05, "altitude offset {h}");
        }
    }

    #[test]
    fn test_unsupported_bodies_yield_nothing() {
        let observer = Observer::new(10.0, 10.0).unwrap();
        for body in [BodyId::Earth, BodyId::Pluto, BodyId::Iss] {
            let rs = search_rise_set(body, observer, Timestamp::from_millis(0), 1.0).unwrap();
            assert_eq!(rs, RiseSet::default());
        }
    }

    #[test]
    fn test_invalid_observer() {
        assert!(Observer::new(91.0, 0.0).is_err());
        assert!(Observer::new(0.0, f64::NAN).is_err());
        assert!(Observer::new(-90.0, 359.0).is_ok());
    }
}
