//! Worker message protocol.
//!
//! Every message is a JSON object whose `type` field is the tag. Requests
//! may carry an `id`, which the matching response echoes so callers can
//! correlate out-of-order replies. Timestamps are Unix milliseconds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A unit of work for the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    /// Scene positions for a batch of bodies from the analytic model.
    ComputePositions { date: i64, bodies: Vec<String> },
    /// Lunar phase angle and lit fraction.
    ComputeMoonPhases { date: i64 },
    /// Next rise and set within one day for an observer.
    ComputeRiseSet {
        date: i64,
        lat: f64,
        lon: f64,
        body: String,
    },
    /// Single-body position through the precision resolver.
    JplQuery { date: i64, body: String },
}

impl Request {
    /// Protocol tag of this request.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::ComputePositions { .. } => "COMPUTE_POSITIONS",
            Request::ComputeMoonPhases { .. } => "COMPUTE_MOON_PHASES",
            Request::ComputeRiseSet { .. } => "COMPUTE_RISE_SET",
            Request::JplQuery { .. } => "JPL_QUERY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub request: Request,
}

impl RequestEnvelope {
    pub fn new(id: Option<u64>, request: Request) -> Self {
        Self { id, request }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Response {
    /// Body name as requested → scene position. Unknown names map to the
    /// origin.
    PositionsResult {
        positions: BTreeMap<String, [f64; 3]>,
    },
    MoonPhaseResult { phase: f64, illumination: f64 },
    /// ISO-8601 instants, `null` when the event does not occur.
    RiseSetResult {
        body: String,
        rise: Option<String>,
        set: Option<String>,
    },
    JplResult { body: String, position: [f64; 3] },
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub response: Response,
}

impl ResponseEnvelope {
    pub fn new(id: Option<u64>, response: Response) -> Self {
        Self { id, response }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Errors decoding or encoding protocol messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty message")]
    Empty,
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode one JSON request.
pub fn decode_request(text: &str) -> Result<RequestEnvelope, ProtocolError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ProtocolError::Empty);
    }
    Ok(serde_json::from_str(text)?)
}

/// Encode a response as a single JSON line (no trailing newline).
pub fn encode_response(envelope: &ResponseEnvelope) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(envelope)?)
}

/// Best-effort `id` from a line that failed to decode as a request.
pub fn salvage_id(text: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()?
        .get("id")?
        .as_u64()
}
