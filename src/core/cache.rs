use crate::core::clock::{Clock, SystemClock};
use crate::core::currency::{CacheStats, PairRate};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    rate: PairRate,
    fetched_at: Instant,
}

/// Time-bounded in-memory cache of pair rates.
///
/// Expired entries are not evicted; they stay in the map until overwritten or
/// cleared and still count towards [`CacheStats::size`].
pub struct RateCache {
    inner: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Cache key for an ordered pair. `EUR-USD` and `USD-EUR` are distinct.
    pub fn key(from: &str, to: &str) -> String {
        format!("{from}-{to}")
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &str) -> Option<PairRate> {
        let cache = self.inner.lock().await;
        let Some(entry) = cache.get(key) else {
            debug!("Cache MISS for key: {}", key);
            return None;
        };

        let age = self.clock.now().saturating_duration_since(entry.fetched_at);
        if age >= self.ttl {
            debug!("Cache entry expired for key: {} (age {:?})", key, age);
            return None;
        }
        debug!("Cache HIT for key: {}", key);
        Some(entry.rate.clone())
    }

    pub async fn put(&self, key: String, rate: PairRate) {
        let entry = CacheEntry {
            rate,
            fetched_at: self.clock.now(),
        };

        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        cache.insert(key, entry);
    }

    pub async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }

    pub async fn stats(&self) -> CacheStats {
        let cache = self.inner.lock().await;
        CacheStats {
            size: cache.len(),
            ttl: self.ttl,
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
