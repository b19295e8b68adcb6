//! The closed set of bodies the core knows about.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EphemerisError;

/// A celestial body or spacecraft identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BodyId {
    Sun,
    Moon,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    #[serde(rename = "ISS")]
    Iss,
}

impl BodyId {
    /// Every identifier, Sun outward, spacecraft last.
    pub const ALL: [BodyId; 12] = [
        BodyId::Sun,
        BodyId::Moon,
        BodyId::Mercury,
        BodyId::Venus,
        BodyId::Earth,
        BodyId::Mars,
        BodyId::Jupiter,
        BodyId::Saturn,
        BodyId::Uranus,
        BodyId::Neptune,
        BodyId::Pluto,
        BodyId::Iss,
    ];

    /// The eight major planets.
    pub const PLANETS: [BodyId; 8] = [
        BodyId::Mercury,
        BodyId::Venus,
        BodyId::Earth,
        BodyId::Mars,
        BodyId::Jupiter,
        BodyId::Saturn,
        BodyId::Uranus,
        BodyId::Neptune,
    ];

    /// Canonical display name, also the wire name.
    pub fn name(self) -> &'static str {
        match self {
            BodyId::Sun => "Sun",
            BodyId::Moon => "Moon",
            BodyId::Mercury => "Mercury",
            BodyId::Venus => "Venus",
            BodyId::Earth => "Earth",
            BodyId::Mars => "Mars",
            BodyId::Jupiter => "Jupiter",
            BodyId::Saturn => "Saturn",
            BodyId::Uranus => "Uranus",
            BodyId::Neptune => "Neptune",
            BodyId::Pluto => "Pluto",
            BodyId::Iss => "ISS",
        }
    }

    /// JPL Horizons `COMMAND` code, if the body is queried remotely.
    pub fn horizons_id(self) -> Option<&'static str> {
        match self {
            BodyId::Mercury => Some("199"),
            BodyId::Venus => Some("299"),
            BodyId::Earth => Some("399"),
            BodyId::Mars => Some("499"),
            BodyId::Jupiter => Some("599"),
            BodyId::Saturn => Some("699"),
            BodyId::Uranus => Some("799"),
            BodyId::Neptune => Some("899"),
            BodyId::Pluto => Some("999"),
            BodyId::Iss => Some("-125544"),
            BodyId::Sun | BodyId::Moon => None,
        }
    }

    pub fn is_planet(self) -> bool {
        Self::PLANETS.contains(&self)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyId {
    type Err = EphemerisError;

    /// Case-insensitive match on the canonical name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|body| body.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EphemerisError::UnknownBody(s.to_string()))
    }
}
