//! Fixed-window per-client admission control.
//!
//! Each client key owns a `(count, window_start)` pair. The first request of
//! a window resets the pair to `(1, now)`; later requests increment the count
//! until the limit, after which requests are rejected without touching the
//! state. Keys are never evicted.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

/// Default requests per window.
pub const DEFAULT_RATE_LIMIT: u32 = 20;
/// Default window length.
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy)]
struct RateState {
    count: u32,
    window_start: Instant,
}

/// Fixed-window rate limiter shared by all requests of a server.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    state: Mutex<HashMap<String, RateState>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW)
    }
}

impl RateLimiter {
    /// Creates a limiter admitting `limit` requests per `window` per key.
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` when the request from `key` must be rejected.
    pub fn is_limited(&self, key: &str) -> bool {
        self.is_limited_at(key, Instant::now())
    }

    /// [`is_limited`](Self::is_limited) against an explicit clock reading.
    pub fn is_limited_at(&self, key: &str, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let window = self.window;
        let in_window = state
            .get(key)
            .is_some_and(|e| now.saturating_duration_since(e.window_start) < window);

        if !in_window {
            state.insert(
                key.to_string(),
                RateState {
                    count: 1,
                    window_start: now,
                },
            );
            return false;
        }

        if let Some(entry) = state.get_mut(key) {
            if entry.count >= self.limit {
                debug!(key, count = entry.count, "rate limit exceeded");
                return true;
            }
            entry.count += 1;
        }
        false
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
