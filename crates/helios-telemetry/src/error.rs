/// Errors from the telemetry layer.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Not one of the planets with known scaling constants.
    #[error("unsupported planet: {0:?}")]
    UnsupportedPlanet(String),

    /// Heliocentric distance must be finite and positive.
    #[error("invalid heliocentric distance {0} AU")]
    InvalidDistance(f64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed feed: {0}")]
    Json(#[from] serde_json::Error),

    /// The feed decoded but held no records.
    #[error("feed returned no records")]
    EmptySeries,
}
