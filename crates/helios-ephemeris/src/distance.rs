//! Distances between scene positions in physical units.

use crate::{AU_TO_SCENE_SCALE, SceneVector};

pub const KM_PER_AU: f64 = 149_597_870.7;
pub const MILES_PER_KM: f64 = 0.621_371;
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Separation between two scene positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    pub scene_units: f64,
    pub au: f64,
    pub km: f64,
    pub miles: f64,
}

impl Distance {
    pub fn between(a: SceneVector, b: SceneVector) -> Self {
        let scene_units = a.0.distance(b.0);
        let au = scene_units / AU_TO_SCENE_SCALE;
        let km = au * KM_PER_AU;
        Self {
            scene_units,
            au,
            km,
            miles: km * MILES_PER_KM,
        }
    }

    pub fn light_travel_time(&self) -> TravelTime {
        TravelTime::from_seconds(self.km / SPEED_OF_LIGHT_KM_S)
    }
}

/// A duration expressed in the largest unit that keeps the value readable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TravelTime {
    Seconds(f64),
    Minutes(f64),
    Hours(f64),
    Days(f64),
}

impl TravelTime {
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds < 60.0 {
            return Self::Seconds(seconds);
        }
        let minutes = seconds / 60.0;
        if minutes < 60.0 {
            return Self::Minutes(minutes);
        }
        let hours = minutes / 60.0;
        if hours < 24.0 {
            return Self::Hours(hours);
        }
        Self::Days(hours / 24.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_one_au_apart() {
        let a = SceneVector(DVec3::ZERO);
        let b = SceneVector(DVec3::new(0.0, 0.0, AU_TO_SCENE_SCALE));
        let d = Distance::between(a, b);
        assert!((d.au - 1.0).abs() < 1e-12);
        assert!((d.km - KM_PER_AU).abs() < 1e-3);
        assert!((d.miles - KM_PER_AU * MILES_PER_KM).abs() < 1e-3);
    }

    #[test]
    fn test_sunlight_takes_about_eight_minutes() {
        let d = Distance::between(
            SceneVector::ORIGIN,
            SceneVector(DVec3::new(AU_TO_SCENE_SCALE, 0.0, 0.0)),
        );
        match d.light_travel_time() {
            TravelTime::Minutes(m) => assert!((m - 8.3167).abs() < 0.01, "{m}"),
            other => panic!("expected minutes, got {other:?}"),
        }
    }

    #[test]
    fn test_unit_thresholds() {
        assert_eq!(TravelTime::from_seconds(59.0), TravelTime::Seconds(59.0));
        assert_eq!(TravelTime::from_seconds(7_200.0), TravelTime::Hours(2.0));
        assert_eq!(TravelTime::from_seconds(172_800.0), TravelTime::Days(2.0));
    }
}
