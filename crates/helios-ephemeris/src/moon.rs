//! Low-precision geocentric Sun and Moon positions and the lunar phase.
//!
//! Truncated Meeus series: the Moon's longitude is good to ~0.3°, which is
//! far finer than a phase display or a rise/set search needs.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::Timestamp;
use crate::distance::KM_PER_AU;

/// Geocentric ecliptic coordinates of date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipticPosition {
    /// Longitude in degrees, `[0, 360)`.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Distance from Earth's centre in AU.
    pub distance_au: f64,
}

impl EclipticPosition {
    /// Rectangular ecliptic coordinates in AU.
    pub fn to_vector(&self) -> DVec3 {
        let (sin_lon, cos_lon) = self.longitude.to_radians().sin_cos();
        let (sin_lat, cos_lat) = self.latitude.to_radians().sin_cos();
        DVec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat) * self.distance_au
    }
}

/// Phase angle and lit fraction of the Moon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonPhase {
    /// Moon-minus-Sun ecliptic longitude in degrees: 0 new, 90 first
    /// quarter, 180 full, 270 last quarter.
    pub phase: f64,
    /// Illuminated fraction in `[0, 1]`.
    pub illumination: f64,
}

/// `(1 - cos(phase)) / 2` with the phase in degrees.
pub fn illumination_from_phase(phase_deg: f64) -> f64 {
    (1.0 - phase_deg.to_radians().cos()) / 2.0
}

/// The Moon's phase at `time`.
pub fn moon_phase(time: Timestamp) -> MoonPhase {
    let phase = (moon_position(time).longitude - sun_position(time).longitude).rem_euclid(360.0);
    MoonPhase {
        phase,
        illumination: illumination_from_phase(phase),
    }
}

/// Apparent geocentric position of the Sun.
pub fn sun_position(time: Timestamp) -> EclipticPosition {
    let t = time.centuries_since_j2000();
    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t).to_radians();
    let e = 0.016_708_634 - 0.000_042_037 * t;
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();
    let true_anomaly = m + c.to_radians();
    let radius = 1.000_001_018 * (1.0 - e * e) / (1.0 + e * true_anomaly.cos());
    EclipticPosition {
        longitude: (l0 + c).rem_euclid(360.0),
        latitude: 0.0,
        distance_au: radius,
    }
}

/// Geocentric position of the Moon.
pub fn moon_position(time: Timestamp) -> EclipticPosition {
    let t = time.centuries_since_j2000();
    let lp = 218.316_447_7 + 481_267.881_234_21 * t;
    let d = (297.850_192_1 + 445_267.111_403_4 * t).to_radians();
    let m = (357.529_109_2 + 35_999.050_290_9 * t).to_radians();
    let mp = (134.963_396_4 + 477_198.867_505_5 * t).to_radians();
    let f = (93.272_095_0 + 483_202.017_523_3 * t).to_radians();

    let longitude = lp
        + 6.288_774 * mp.sin()
        + 1.274_027 * (2.0 * d - mp).sin()
        + 0.658_314 * (2.0 * d).sin()
        + 0.213_618 * (2.0 * mp).sin()
        - 0.185_116 * m.sin()
        - 0.114_332 * (2.0 * f).sin()
        + 0.058_793 * (2.0 * d - 2.0 * mp).sin()
        + 0.057_066 * (2.0 * d - m - mp).sin()
        + 0.053_322 * (2.0 * d + mp).sin()
        + 0.045_758 * (2.0 * d - m).sin()
        - 0.040_923 * (m - mp).sin()
        - 0.034_720 * d.sin()
        - 0.030_383 * (m + mp).sin();

    let latitude = 5.128_122 * f.sin()
        + 0.280_602 * (mp + f).sin()
        + 0.277_693 * (mp - f).sin()
        + 0.173_237 * (2.0 * d - f).sin()
        + 0.055_413 * (2.0 * d - mp + f).sin()
        + 0.046_271 * (2.0 * d - mp - f).sin();

    let distance_km = 385_000.56
        - 20_905.355 * mp.cos()
        - 3_699.111 * (2.0 * d - mp).cos()
        - 2_955.968 * (2.0 * d).cos()
        - 569.925 * (2.0 * mp).cos();

    EclipticPosition {
        longitude: longitude.rem_euclid(360.0),
        latitude,
        distance_au: distance_km / KM_PER_AU,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illumination_boundaries() {
        assert!(illumination_from_phase(0.0).abs() < 1e-12);
        assert!((illumination_from_phase(180.0) - 1.0).abs() < 1e-12);
        assert!((illumination_from_phase(90.0) - 0.5).abs() < 1e-12);
        assert!(illumination_from_phase(360.0).abs() < 1e-12);
    }

    #[test]
    fn test_full_moon() {
        // Full moon 2024-01-25 17:54 UTC.
        let p = moon_phase(Timestamp::from_millis(1_706_205_240_000));
        assert!((p.phase - 180.0).abs() < 3.0, "phase = {}", p.phase);
        assert!(p.illumination > 0.99);
    }

    #[test]
    fn test_new_moon() {
        // New moon 2024-01-11 11:57 UTC.
        let p = moon_phase(Timestamp::from_millis(1_704_974_220_000));
        let distance_from_new = p.phase.min(360.0 - p.phase);
        assert!(distance_from_new < 3.0, "phase = {}", p.phase);
        assert!(p.illumination < 0.01);
    }

    #[test]
    fn test_phase_range() {
        for day in 0..60 {
            let p = moon_phase(Timestamp::from_millis(1_700_000_000_000 + day * 86_400_000));
            assert!((0.0..360.0).contains(&p.phase));
            assert!((0.0..=1.0).contains(&p.illumination));
        }
    }

    #[test]
    fn test_moon_distance_range() {
        for day in 0..30 {
            let km = moon_position(Timestamp::from_millis(1_700_000_000_000 + day * 86_400_000))
                .distance_au
                * KM_PER_AU;
            assert!((350_000.0..415_000.0).contains(&km), "{km}");
        }
    }

    #[test]
    fn test_sun_distance_near_one_au() {
        let sun = sun_position(Timestamp::from_millis(1_700_000_000_000));
        assert!((sun.distance_au - 1.0).abs() < 0.02);
        assert!((sun.to_vector().length() - sun.distance_au).abs() < 1e-12);
    }
}
