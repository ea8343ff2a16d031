//! Cache for the dataset overview returned by the Discover tool.
//!
//! The overview is identical for every request, so the first successful
//! Discover call populates the cache and every later attempt or request
//! reuses it. The lock is never held across the upstream call: two requests
//! that both find the cache empty will both fetch and both store, and the
//! last write wins. Both writes carry the same overview.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

#[derive(Debug)]
struct Cached {
    payload: Arc<Value>,
    stored_at: Instant,
}

/// Owned, injectable cache of the Discover payload.
#[derive(Debug, Default)]
pub struct DiscoveryCache {
    ttl: Option<Duration>,
    slot: RwLock<Option<Cached>>,
}

impl DiscoveryCache {
    /// Creates a cache whose entry never expires.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache whose entry expires `ttl` after it was stored.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            slot: RwLock::new(None),
        }
    }

    /// Returns the cached overview if present and not expired.
    pub fn get(&self) -> Option<Arc<Value>> {
        self.get_at(Instant::now())
    }

    fn get_at(&self, now: Instant) -> Option<Arc<Value>> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        let cached = slot.as_ref()?;
        if let Some(ttl) = self.ttl
            && now.saturating_duration_since(cached.stored_at) >= ttl
        {
            debug!("discovery cache entry expired");
            return None;
        }
        Some(Arc::clone(&cached.payload))
    }

    /// Stores an overview, replacing any previous one.
    pub fn store(&self, payload: Value) -> Arc<Value> {
        let payload = Arc::new(payload);
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Cached {
            payload: Arc::clone(&payload),
            stored_at: Instant::now(),
        });
        payload
    }

    /// Drops the cached overview.
    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}
