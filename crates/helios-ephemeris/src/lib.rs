//! Heliocentric ephemeris for the helios compute core.
//!
//! A fast Keplerian model answers every request locally. Single-body
//! requests may be upgraded through [`PrecisionEphemerisResolver`], which
//! queries JPL Horizons behind a time-bucketed cache and falls back to the
//! local model on any failure. [`to_scene`] maps ecliptic AU vectors into the
//! Y-up scene frame shared by every consumer.

pub mod analytic;
pub mod body;
pub mod coords;
pub mod distance;
mod error;
pub mod moon;
pub mod precision;
pub mod rise_set;
pub mod time;
pub mod vector;

pub use analytic::AnalyticEphemerisModel;
pub use body::BodyId;
pub use coords::{AU_TO_SCENE_SCALE, from_scene, to_scene};
pub use error::{EphemerisError, FetchError};
pub use moon::{MoonPhase, illumination_from_phase, moon_phase};
pub use precision::{
    Clock, HorizonsTransport, PrecisionEphemerisResolver, ResolverSettings, SystemClock,
};
pub use rise_set::{Observer, RiseSet, search_rise_set};
pub use time::Timestamp;
pub use vector::{HeliocentricVector, SceneVector};
