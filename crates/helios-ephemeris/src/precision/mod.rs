//! Remote high-precision ephemeris with a time-bucketed cache.

pub mod cache;
pub mod horizons;
mod resolver;

pub use cache::{CacheKey, EphemerisCache};
pub use horizons::{HorizonsQuery, HorizonsTransport, UreqTransport, parse_response};
pub use resolver::{
    Clock, DEFAULT_CACHE_TTL, DEFAULT_REQUEST_TIMEOUT, PrecisionEphemerisResolver,
    ResolverSettings, SystemClock,
};
