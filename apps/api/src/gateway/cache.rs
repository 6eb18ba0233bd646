//! Result Cache — bounded, time-expiring store of validated analysis results.
//!
//! Keyed by request fingerprint; values are the serialized, already-validated
//! result so a hit never needs re-validation. Capacity is enforced with LRU
//! eviction, expiry is checked lazily on read and by `purge_expired`.

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;
use tokio::time::Instant;

/// Default cache capacity.
pub const DEFAULT_MAX_ENTRIES: usize = 1_000;

/// TTL applied to freshly validated results.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Longer TTLs are clamped to this.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

pub struct ResultCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the cached value, or `None` if absent or expired.
    /// An expired entry is removed on the way out.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let expired = match entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    /// Inserts or replaces `key`, expiring `ttl` from now (at most `MAX_TTL`).
    pub fn set(&self, key: &str, value: String, ttl: Duration) {
        let now = Instant::now();
        let entry = CacheEntry {
            value,
            expires_at: now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now),
        };
        self.entries.lock().put(key.to_string(), entry);
    }

    /// Removes every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| now >= e.expires_at)
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
