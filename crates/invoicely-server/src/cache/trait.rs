//! Cache trait definition.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Cache operation result.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Cache backend trait.
///
/// Values are opaque bytes so the trait stays object safe; typed access goes
/// through [`CacheExt`].
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value from cache.
    async fn get_raw(&self, key: &str) -> CacheResult<Option<Bytes>>;

    /// Set a value in cache with TTL.
    async fn set_raw(&self, key: &str, value: Bytes, ttl: Duration) -> CacheResult<()>;

    /// Delete a value from cache. Returns whether it was present.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Delete `prefix` itself and every key continuing it with `/`, `?` or `#`.
    ///
    /// `/api/v1/activity` does not match `/api/v1/activity-logs`.
    async fn delete_prefix(&self, prefix: &str) -> CacheResult<u64>;

    /// Check if an unexpired entry exists.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Get time to live for key.
    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>>;

    /// Clear all cache entries.
    async fn clear(&self) -> CacheResult<()>;

    /// Get cache statistics.
    async fn stats(&self) -> CacheStats;
}

/// Typed access over any [`Cache`], encoded as JSON.
#[async_trait]
pub trait CacheExt: Cache {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) -> CacheResult<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set_raw(key, Bytes::from(bytes), ttl).await
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

/// Cache statistics.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);

        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
