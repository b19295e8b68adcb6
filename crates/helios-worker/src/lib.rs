//! Compute worker boundary for helios.
//!
//! Requests and responses are the tagged JSON messages in [`protocol`].
//! [`Router`] maps one request to one response; [`ComputeScheduler`] runs the
//! router on a pool of background threads and hands responses back through
//! a channel.

mod error;
pub mod protocol;
pub mod router;
pub mod scheduler;

pub use error::ComputeError;
pub use protocol::{
    ProtocolError, Request, RequestEnvelope, Response, ResponseEnvelope, decode_request,
    encode_response,
};
pub use router::{PrecisionBackend, Router};
pub use scheduler::{ComputeScheduler, RequestPhase, resolve_worker_count};
