//! In-memory cache implementation.

use super::r#trait::{Cache, CacheResult, CacheStats};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

/// In-memory cache entry.
struct CacheEntry {
    value: Bytes,
    inserted_at: Instant,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory cache implementation.
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
    stats: CacheStatsInner,
}

#[derive(Default)]
struct CacheStatsInner {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl MemoryCache {
    /// Create an unbounded cache.
    pub fn new() -> Self {
        Self::with_capacity_bound(usize::MAX)
    }

    /// Create a cache holding at most `max_entries` entries.
    pub fn with_capacity_bound(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            stats: CacheStatsInner::default(),
        }
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "Swept expired cache entries");
        }
        removed
    }

    /// Spawn the periodic sweep task for this cache.
    ///
    /// The task only holds a weak reference and exits once the cache is dropped.
    pub fn spawn_sweeper(cache: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(cache);
        tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = weak.upgrade() else {
                    debug!("Cache dropped, sweeper exiting");
                    break;
                };
                cache.sweep_expired();
            }
        })
    }

    /// Make room for `key` when the cache is full.
    ///
    /// Expired entries go first; a live entry is evicted, oldest insert
    /// first, only when none were expired. Concurrent inserts may briefly
    /// overshoot `max_entries` since the check and the insert are separate.
    fn evict_if_needed(&self, key: &str) {
        if self.entries.len() < self.max_entries || self.entries.contains_key(key) {
            return;
        }

        if self.sweep_expired() > 0 && self.entries.len() < self.max_entries {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().inserted_at)
            .map(|entry| entry.key().clone());

        if let Some(oldest) = oldest {
            self.entries.remove(&oldest);
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(key = %oldest, "Cache evicted oldest entry");
        }
    }
}

fn is_under_prefix(key: &str, prefix: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let now = Instant::now();
        let found = self
            .entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));

        match found {
            Some(Some(value)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = key, "Cache hit");
                Ok(Some(value))
            }
            Some(None) => {
                self.entries.remove_if(key, |_, entry| !entry.is_live(now));
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = key, "Cache miss (expired)");
                Ok(None)
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = key, "Cache miss");
                Ok(None)
            }
        }
    }

    async fn set_raw(&self, key: &str, value: Bytes, ttl: Duration) -> CacheResult<()> {
        self.evict_if_needed(key);

        let now = Instant::now();
        let entry = CacheEntry {
            value,
            inserted_at: now,
            expires_at: now + ttl,
        };

        self.entries.insert(key.to_string(), entry);
        debug!(key = key, ttl_ms = ttl.as_millis() as u64, "Cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let removed = self.entries.remove(key).is_some();
        debug!(key = key, removed, "Cache delete");
        Ok(removed)
    }

    async fn delete_prefix(&self, prefix: &str) -> CacheResult<u64> {
        let mut deleted = 0;
        self.entries.retain(|k, _| {
            if is_under_prefix(k, prefix) {
                deleted += 1;
                false
            } else {
                true
            }
        });

        debug!(prefix = prefix, deleted = deleted, "Cache delete prefix");
        Ok(deleted)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        Ok(self.entries.get(key).is_some_and(|entry| entry.is_live(now)))
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now))
    }

    async fn clear(&self) -> CacheResult<()> {
        self.entries.clear();
        debug!("Cache cleared");
        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            size: self.entries.len() as u64,
            evictions: self.stats.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheExt;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_get_after_set_hits_until_ttl() {
        let cache = MemoryCache::new();
        cache.set_raw("k", Bytes::from_static(b"v"), TTL).await.unwrap();

        assert_eq!(cache.get_raw("k").await.unwrap().as_deref(), Some(&b"v"[..]));

        tokio::time::advance(TTL).await;
        assert!(cache.get_raw("k").await.unwrap().is_none());
        assert!(cache.is_empty());

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_counts_down() {
        let cache = MemoryCache::new();
        cache.set_raw("k", Bytes::new(), TTL).await.unwrap();

        tokio::time::advance(Duration::from_secs(15)).await;
        assert_eq!(cache.ttl("k").await.unwrap(), Some(Duration::from_secs(45)));
        assert!(cache.exists("k").await.unwrap());

        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(cache.ttl("k").await.unwrap(), None);
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicts_oldest_insert_at_capacity() {
        let cache = MemoryCache::with_capacity_bound(2);
        cache.set_raw("a", Bytes::new(), TTL).await.unwrap();
        tokio::time::advance(Duration::from_millis(1)).await;
        cache.set_raw("b", Bytes::new(), TTL).await.unwrap();
        tokio::time::advance(Duration::from_millis(1)).await;

        // Overwriting an existing key never evicts.
        cache.set_raw("a", Bytes::new(), TTL).await.unwrap();
        assert_eq!(cache.len(), 2);

        tokio::time::advance(Duration::from_millis(1)).await;
        cache.set_raw("c", Bytes::new(), TTL).await.unwrap();

        assert!(!cache.exists("b").await.unwrap());
        assert!(cache.exists("a").await.unwrap());
        assert!(cache.exists("c").await.unwrap());
        assert_eq!(cache.stats().await.evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_expired() {
        let cache = MemoryCache::new();
        cache.set_raw("short", Bytes::new(), Duration::from_secs(1)).await.unwrap();
        cache.set_raw("long", Bytes::new(), TTL).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_and_stops_when_dropped() {
        let cache = Arc::new(MemoryCache::new());
        cache.set_raw("k", Bytes::new(), Duration::from_secs(1)).await.unwrap();

        let handle = MemoryCache::spawn_sweeper(&cache, Duration::from_secs(5));
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(cache.is_empty());

        drop(cache);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_delete_prefix() {
        let cache = MemoryCache::new();
        for key in [
            "/api/v1/dashboard",
            "/api/v1/dashboard/admin#user:1",
            "/api/v1/dashboard?range=7d",
            "/api/v1/dashboard#roles:user",
            "/api/v1/activity-logs",
        ] {
            cache.set_raw(key, Bytes::new(), TTL).await.unwrap();
        }

        assert_eq!(cache.delete_prefix("/api/v1/dashboard").await.unwrap(), 4);
        assert_eq!(cache.len(), 1);
        assert!(cache.delete("/api/v1/activity-logs").await.unwrap());
        assert!(!cache.delete("/api/v1/activity-logs").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_prefix_stops_at_segment_boundary() {
        let cache = MemoryCache::new();
        for key in ["/api/v1/activity#user:1", "/api/v1/activity-logs#user:1", "/api/v1/activitylog"] {
            cache.set_raw(key, Bytes::new(), TTL).await.unwrap();
        }

        assert_eq!(cache.delete_prefix("/api/v1/activity").await.unwrap(), 1);
        assert!(cache.exists("/api/v1/activity-logs#user:1").await.unwrap());
        assert!(cache.exists("/api/v1/activitylog").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cache_drops_expired_before_live_entries() {
        let cache = MemoryCache::with_capacity_bound(2);
        cache.set_raw("old-live", Bytes::new(), TTL).await.unwrap();
        tokio::time::advance(Duration::from_millis(1)).await;
        cache.set_raw("stale", Bytes::new(), Duration::from_secs(1)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.set_raw("new", Bytes::new(), TTL).await.unwrap();

        assert!(cache.exists("old-live").await.unwrap());
        assert!(cache.exists("new").await.unwrap());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().await.evictions, 0);
    }

    #[tokio::test]
    async fn test_typed_access() {
        let cache = MemoryCache::new();
        cache.set("n", &vec![1u32, 2, 3], TTL).await.unwrap();
        let value: Option<Vec<u32>> = cache.get("n").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));

        let wrong: crate::cache::CacheResult<Option<String>> = cache.get("n").await;
        assert!(wrong.is_err());
    }
}
