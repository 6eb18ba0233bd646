//! Rate Limiter — per-identity fixed-window admission control.
//!
//! One `RateWindow` per identity, held in an LRU map bounded by
//! `max_tracked_identities`. When the map is full, the least-recently-used
//! window is dropped and that identity starts over on its next call (fail-open).
//!
//! The limit is supplied per call so different endpoints can share the same
//! windows with different budgets.

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;
use tokio::time::Instant;

/// Default window length (one minute).
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(60_000);

/// Default number of identities tracked at once.
pub const DEFAULT_MAX_TRACKED_IDENTITIES: usize = 500;

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allow,
    /// Denied. `retry_after` is the time left in the identity's current window.
    Reject { retry_after: Duration },
}

impl RateDecision {
    #[cfg(test)]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimiterConfig {
    pub interval: Duration,
    pub max_tracked_identities: usize,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_tracked_identities: DEFAULT_MAX_TRACKED_IDENTITIES,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// Shared, process-wide limiter. Every check is a single critical section.
pub struct RateLimiter {
    windows: Mutex<LruCache<String, RateWindow>>,
    interval: Duration,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_tracked_identities)
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            windows: Mutex::new(LruCache::new(capacity)),
            interval: config.interval,
        }
    }

    /// Admits or rejects one call for `identity` against `limit` calls per window.
    ///
    /// A limit of zero rejects every call.
    pub fn check(&self, identity: &str, limit: u32) -> RateDecision {
        let now = Instant::now();
        let mut windows = self.windows.lock();

        // `get_mut` also promotes the identity to most-recently-used.
        if let Some(window) = windows.get_mut(identity) {
            let elapsed = now.duration_since(window.window_start);
            if elapsed < self.interval {
                if window.count >= limit {
                    return RateDecision::Reject {
                        retry_after: self.interval - elapsed,
                    };
                }
                window.count += 1;
                return RateDecision::Allow;
            }
        }

        if limit == 0 {
            return RateDecision::Reject {
                retry_after: self.interval,
            };
        }

        // New or lapsed window. `put` evicts the LRU identity when full.
        windows.put(
            identity.to_string(),
            RateWindow {
                count: 1,
                window_start: now,
            },
        );
        RateDecision::Allow
    }

    /// Drops windows whose interval has lapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock();

        let stale: Vec<String> = windows
            .iter()
            .filter(|(_, w)| now.duration_since(w.window_start) >= self.interval)
            .map(|(k, _)| k.clone())
            .collect();

        for key in &stale {
            windows.pop(key);
        }
        stale.len()
    }

    /// Number of identities currently tracked.
    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }

    /// Calls counted in the identity's current window, without touching LRU order.
    #[cfg(test)]
    pub fn peek_count(&self, identity: &str) -> Option<u32> {
        self.windows.lock().peek(identity).map(|w| w.count)
    }
}
