//! Space-weather telemetry: the live near-Earth feed and its scaling to
//! other planets.

mod error;
pub mod exo;
pub mod feed;
pub mod storm;

pub use error::TelemetryError;
pub use exo::{ExoPlanet, ExoplanetTelemetryScaler, LocalConditions, ScaledTelemetry};
pub use feed::{
    DataQuality, SolarWindFeed, SolarWindReading, SpaceWeather, TelemetryTransport,
    UreqTelemetryTransport,
};
pub use storm::{StormLevel, estimate_dst};
