//! Time-bucketed cache of remote vectors.

use std::time::Duration;

use dashmap::DashMap;

use crate::{BodyId, HeliocentricVector, Timestamp};

/// Cache key: the body plus the index of the TTL-sized time bucket the
/// requested timestamp falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub body: BodyId,
    pub bucket: i64,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    vector: HeliocentricVector,
    /// Wall-clock time after which the entry is stale.
    expires_at: Timestamp,
}

/// Concurrent map from [`CacheKey`] to a fetched vector.
///
/// Requests for the same body within one bucket share a single entry. An
/// entry expires one TTL after it was stored; expired entries are evicted on
/// the next read of their key.
pub struct EphemerisCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl_ms: i64,
}

impl EphemerisCache {
    pub fn new(ttl: Duration) -> Self {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX).max(1);
        Self {
            entries: DashMap::new(),
            ttl_ms,
        }
    }

    pub fn key(&self, body: BodyId, time: Timestamp) -> CacheKey {
        CacheKey {
            body,
            bucket: time.millis().div_euclid(self.ttl_ms),
        }
    }

    /// Cached vector for `body` near `time`, if present and fresh at `now`.
    pub fn get(&self, body: BodyId, time: Timestamp, now: Timestamp) -> Option<HeliocentricVector> {
        let key = self.key(body, time);
        let entry = *self.entries.get(&key)?;
        if now < entry.expires_at {
            Some(entry.vector)
        } else {
            self.entries.remove_if(&key, |_, e| e.expires_at <= now);
            None
        }
    }

    pub fn insert(&self, body: BodyId, time: Timestamp, vector: HeliocentricVector, now: Timestamp) {
        self.entries.insert(
            self.key(body, time),
            CacheEntry {
                vector,
                expires_at: now.plus_millis(self.ttl_ms),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
