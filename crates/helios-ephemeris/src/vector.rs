//! Heliocentric and scene-space vector types.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Position (AU) and optional velocity (AU/day) in the heliocentric
/// ecliptic J2000 frame: X toward the vernal equinox, Z toward the north
/// ecliptic pole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeliocentricVector {
    pub position: DVec3,
    pub velocity: Option<DVec3>,
}

impl HeliocentricVector {
    pub const ORIGIN: Self = Self {
        position: DVec3::ZERO,
        velocity: None,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: DVec3::new(x, y, z),
            velocity: None,
        }
    }

    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Position and (when present) velocity are free of NaN and infinity.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_none_or(|v| v.is_finite())
    }

    /// Distance from the Sun in AU.
    pub fn distance_au(&self) -> f64 {
        self.position.length()
    }
}

/// A position in scene units, Y-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct SceneVector(pub DVec3);

impl SceneVector {
    pub const ORIGIN: Self = Self(DVec3::ZERO);

    pub fn to_array(self) -> [f64; 3] {
        self.0.to_array()
    }
}

impl From<[f64; 3]> for SceneVector {
    fn from(value: [f64; 3]) -> Self {
        Self(DVec3::from_array(value))
    }
}

impl From<SceneVector> for [f64; 3] {
    fn from(value: SceneVector) -> Self {
        value.to_array()
    }
}
