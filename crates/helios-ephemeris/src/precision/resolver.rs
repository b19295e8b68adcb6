//! Single-body precision lookups with caching and analytic fallback.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use super::cache::EphemerisCache;
use super::horizons::{HorizonsQuery, HorizonsTransport, UreqTransport, parse_response};
use crate::{AnalyticEphemerisModel, BodyId, EphemerisError, FetchError, HeliocentricVector, Timestamp};

/// Default bound on one remote request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
/// Default cache bucket width and entry lifetime.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Wall-clock source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Resolves heliocentric vectors through JPL Horizons.
///
/// Owns its cache for its whole lifetime; share the resolver behind an `Arc`
/// to share the cache. [`resolve`](Self::resolve) never fails: any remote
/// problem degrades to [`AnalyticEphemerisModel`], and bodies that model
/// cannot place degrade to the origin.
///
/// Concurrent misses on the same key each issue their own request; the last
/// write wins.
pub struct PrecisionEphemerisResolver {
    transport: Arc<dyn HorizonsTransport>,
    clock: Arc<dyn Clock>,
    cache: EphemerisCache,
    request_timeout: Duration,
    fetches: AtomicU64,
    fallbacks: AtomicU64,
}

impl PrecisionEphemerisResolver {
    pub fn new(transport: Arc<dyn HorizonsTransport>, settings: ResolverSettings) -> Self {
        Self {
            transport,
            clock: Arc::new(SystemClock),
            cache: EphemerisCache::new(settings.cache_ttl),
            request_timeout: settings.request_timeout,
            fetches: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
        }
    }

    /// Resolver talking HTTPS to `base_url`.
    pub fn http(base_url: impl Into<String>, settings: ResolverSettings) -> Self {
        let transport = UreqTransport::new(base_url, settings.request_timeout);
        Self::new(Arc::new(transport), settings)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Best-effort position of `body` at `time`.
    pub async fn resolve(&self, body: BodyId, time: Timestamp) -> HeliocentricVector {
        match self.try_resolve(body, time).await {
            Ok(vector) => vector,
            Err(err) => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                warn!(%body, time = time.millis(), error = %err, "precision lookup failed, using analytic model");
                Self::fallback(body, time)
            }
        }
    }

    /// Cached or freshly fetched remote vector, without fallback.
    pub async fn try_resolve(
        &self,
        body: BodyId,
        time: Timestamp,
    ) -> Result<HeliocentricVector, EphemerisError> {
        if let Some(vector) = self.cache.get(body, time, self.clock.now()) {
            debug!(%body, time = time.millis(), "precision cache hit");
            return Ok(vector);
        }

        let command = body.horizons_id().ok_or(FetchError::NoRemoteId(body))?;
        let query = HorizonsQuery::new(command, time)?;
        let vector = self.fetch(query).await?;

        self.cache.insert(body, time, vector, self.clock.now());
        debug!(%body, time = time.millis(), cached = self.cache.len(), "precision vector stored");
        Ok(vector)
    }

    async fn fetch(&self, query: HorizonsQuery) -> Result<HeliocentricVector, FetchError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let transport = Arc::clone(&self.transport);
        let task = tokio::task::spawn_blocking(move || transport.fetch(&query));

        let body = match tokio::time::timeout(self.request_timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join)) => return Err(FetchError::Transport(format!("fetch task failed: {join}"))),
            Err(_) => {
                let ms = u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX);
                return Err(FetchError::Timeout(ms));
            }
        };
        let vector = parse_response(&body)?;
        if !vector.is_finite() {
            return Err(FetchError::NonFinite);
        }
        Ok(vector)
    }

    fn fallback(body: BodyId, time: Timestamp) -> HeliocentricVector {
        AnalyticEphemerisModel::position(body, time).unwrap_or_else(|err| {
            debug!(%body, error = %err, "no analytic position, using origin");
            HeliocentricVector::ORIGIN
        })
    }

    /// Remote requests issued so far, including failed ones.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Calls answered by the fallback path.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
