//! Scaling of near-Earth solar-wind conditions out to other planets.
//!
//! Density falls off as 1/r². Speed is constant in the supersonic wind. The
//! field magnitude combines a radial 1/r² and an azimuthal 1/r component
//! (Parker spiral).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TelemetryError;

/// Planets with known scaling constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExoPlanet {
    Mars,
    Jupiter,
    Saturn,
    Uranus,
}

impl ExoPlanet {
    pub const ALL: [ExoPlanet; 4] = [
        ExoPlanet::Mars,
        ExoPlanet::Jupiter,
        ExoPlanet::Saturn,
        ExoPlanet::Uranus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExoPlanet::Mars => "Mars",
            ExoPlanet::Jupiter => "Jupiter",
            ExoPlanet::Saturn => "Saturn",
            ExoPlanet::Uranus => "Uranus",
        }
    }

    /// Mean heliocentric distance in AU.
    pub fn distance_au(self) -> f64 {
        match self {
            ExoPlanet::Mars => 1.52,
            ExoPlanet::Jupiter => 5.20,
            ExoPlanet::Saturn => 9.58,
            ExoPlanet::Uranus => 19.20,
        }
    }

    /// Dominant atmospheric gas of the aurora.
    pub fn dominant_gas(self) -> &'static str {
        match self {
            ExoPlanet::Mars => "CO2 / Oxygen",
            ExoPlanet::Jupiter => "Hydrogen / Helium",
            ExoPlanet::Saturn => "Hydrogen",
            ExoPlanet::Uranus => "Hydrogen / Methane",
        }
    }

    /// Aurora display colour, `#RRGGBB`.
    pub fn aurora_colour(self) -> &'static str {
        match self {
            ExoPlanet::Mars => "#4169E1",
            ExoPlanet::Jupiter => "#FF00FF",
            ExoPlanet::Saturn => "#DA70D6",
            ExoPlanet::Uranus => "#E0B0FF",
        }
    }
}

impl fmt::Display for ExoPlanet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExoPlanet {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TelemetryError::UnsupportedPlanet(s.to_string()))
    }
}

/// Solar-wind conditions at some heliocentric distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalConditions {
    pub distance_au: f64,
    /// Particles per cm³.
    pub density: f64,
    /// km/s.
    pub speed: f64,
    /// Interplanetary field magnitude, nT.
    pub bt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledTelemetry {
    pub planet: ExoPlanet,
    #[serde(flatten)]
    pub conditions: LocalConditions,
    pub dominant_gas: &'static str,
    pub aurora_colour: &'static str,
}

pub struct ExoplanetTelemetryScaler;

impl ExoplanetTelemetryScaler {
    /// Scale conditions measured at 1 AU to `planet`.
    pub fn scale(planet: ExoPlanet, earth_density: f64, earth_speed: f64, earth_bt: f64) -> ScaledTelemetry {
        let r = planet.distance_au();
        ScaledTelemetry {
            planet,
            conditions: scale_unchecked(r, earth_density, earth_speed, earth_bt),
            dominant_gas: planet.dominant_gas(),
            aurora_colour: planet.aurora_colour(),
        }
    }

    /// Scale conditions measured at 1 AU to an arbitrary distance `r` (AU).
    pub fn scale_to_distance(
        r: f64,
        earth_density: f64,
        earth_speed: f64,
        earth_bt: f64,
    ) -> Result<LocalConditions, TelemetryError> {
        if !r.is_finite() || r <= 0.0 {
            return Err(TelemetryError::InvalidDistance(r));
        }
        Ok(scale_unchecked(r, earth_density, earth_speed, earth_bt))
    }
}

fn scale_unchecked(r: f64, density: f64, speed: f64, bt: f64) -> LocalConditions {
    let radial = 1.0 / (r * r);
    let azimuthal = 1.0 / r;
    LocalConditions {
        distance_au: r,
        density: density * radial,
        speed,
        bt: bt * (radial * radial + azimuthal * azimuthal).sqrt(),
    }
}
