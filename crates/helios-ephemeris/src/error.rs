//! Ephemeris error types.

use crate::BodyId;

/// Failures inside the ephemeris layer.
///
/// None of these cross the worker boundary as-is: batch queries degrade to a
/// zero vector, precision queries degrade to the analytic model.
#[derive(Debug, thiserror::Error)]
pub enum EphemerisError {
    /// The name does not match any known body.
    #[error("unknown body: {0:?}")]
    UnknownBody(String),

    /// The body is known but this model cannot place it.
    #[error("{body} is not supported by the {model} model")]
    UnsupportedBody { body: BodyId, model: &'static str },

    /// The computation produced NaN or infinity.
    #[error("non-finite {quantity} for {body}")]
    NonFinite { body: BodyId, quantity: &'static str },

    /// The timestamp cannot be represented as a calendar date.
    #[error("timestamp {0} ms is out of range")]
    TimeOutOfRange(i64),

    /// Latitude outside ±90° or longitude outside -180..360°.
    #[error("invalid observer location ({latitude}, {longitude})")]
    InvalidObserver { latitude: f64, longitude: f64 },

    /// The remote lookup failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Remote ephemeris fetch failures. All are recovered by falling back.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// No Horizons identifier exists for the body.
    #[error("no Horizons identifier for {0}")]
    NoRemoteId(BodyId),

    /// Connection, DNS, TLS, or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The request did not finish within the configured timeout.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// The JSON envelope could not be decoded.
    #[error("malformed JSON envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// Horizons returned an `error` field instead of a report.
    #[error("Horizons reported: {0}")]
    Remote(String),

    /// `$$SOE` or `$$EOE` is absent.
    #[error("vector table markers not found")]
    MissingMarker,

    /// The first data row has too few or unparsable fields.
    #[error("malformed vector row: {0:?}")]
    MalformedRow(String),

    /// The row parsed but a position component is NaN or infinite.
    #[error("non-finite vector component")]
    NonFinite,
}
