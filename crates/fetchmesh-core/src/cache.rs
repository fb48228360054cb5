//! In-memory TTL cache keyed by request fingerprint.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::request::Fingerprint;

/// One cached payload with its expiry bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: Value,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Entry is valid iff `now < created_at + ttl`.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Entry counts reported by [`CacheStore::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub live_entries: usize,
    pub expired_entries: usize,
}

/// Thread-safe fingerprint -> entry map with lazy expiry.
///
/// Expired entries are treated as absent: `get` purges them on access, and
/// `purge_expired` sweeps the rest. One store is owned by one fetcher.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<tokio::sync::RwLock<HashMap<Fingerprint, CacheEntry>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
        }
    }

    /// Returns the live entry for a fingerprint, purging it if expired.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        {
            let map = self.inner.read().await;
            match map.get(fingerprint) {
                None => return None,
                Some(entry) if !entry.is_expired() => {
                    debug!(%fingerprint, "cache hit");
                    return Some(entry.clone());
                }
                Some(_) => {}
            }
        }

        // Expired: re-check under the write lock before removing, another
        // task may have overwritten the entry since the read.
        let mut map = self.inner.write().await;
        if map.get(fingerprint).is_some_and(CacheEntry::is_expired) {
            map.remove(fingerprint);
            debug!(%fingerprint, "cache entry expired");
        }
        None
    }

    /// Stores or overwrites unconditionally. Zero TTL is a configuration
    /// mistake, not a disable switch.
    pub async fn put(
        &self,
        fingerprint: Fingerprint,
        value: Value,
        ttl: Duration,
    ) -> Result<(), ConfigError> {
        if ttl.is_zero() {
            return Err(ConfigError::ZeroCacheTtl);
        }

        let mut map = self.inner.write().await;
        debug!(%fingerprint, ttl_secs = ttl.as_secs(), "cache write");
        map.insert(fingerprint, CacheEntry::new(value, ttl));
        Ok(())
    }

    /// Removes one fingerprint; returns whether an entry was present.
    pub async fn invalidate(&self, fingerprint: &Fingerprint) -> bool {
        let mut map = self.inner.write().await;
        map.remove(fingerprint).is_some()
    }

    /// Sweeps all expired entries; returns how many were evicted.
    pub async fn purge_expired(&self) -> usize {
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, entry| !entry.is_expired());
        before - map.len()
    }

    /// Drops every entry; returns how many were removed.
    pub async fn clear(&self) -> usize {
        let mut map = self.inner.write().await;
        let count = map.len();
        map.clear();
        count
    }

    /// Entry count including not-yet-purged expired entries.
    pub async fn len(&self) -> usize {
        let map = self.inner.read().await;
        map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        let map = self.inner.read().await;
        let total_entries = map.len();
        let expired_entries = map.values().filter(|entry| entry.is_expired()).count();
        CacheStats {
            total_entries,
            live_entries: total_entries - expired_entries,
            expired_entries,
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::FetchRequest;
    use serde_json::json;

    fn fingerprint(operation: &str) -> Fingerprint {
        FetchRequest::new(operation)
            .expect("valid operation")
            .fingerprint()
    }

    #[tokio::test]
    async fn miss_then_hit_then_overwrite() {
        let cache = CacheStore::new();
        let key = fingerprint("latest_rates");

        assert!(cache.get(&key).await.is_none());

        cache
            .put(key.clone(), json!({"rate": 0.91}), Duration::from_secs(60))
            .await
            .expect("valid ttl");
        assert_eq!(
            cache.get(&key).await.expect("entry present").value(),
            &json!({"rate": 0.91})
        );

        cache
            .put(key.clone(), json!({"rate": 0.92}), Duration::from_secs(60))
            .await
            .expect("valid ttl");
        assert_eq!(
            cache.get(&key).await.expect("entry present").value(),
            &json!({"rate": 0.92})
        );
    }

    #[tokio::test]
    async fn expired_entry_is_absent_and_purged_on_access() {
        let cache = CacheStore::new();
        let key = fingerprint("latest_rates");

        cache
            .put(key.clone(), json!(1), Duration::from_millis(40))
            .await
            .expect("valid ttl");
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(cache.get(&key).await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn zero_ttl_is_a_config_error() {
        let cache = CacheStore::new();
        let key = fingerprint("latest_rates");

        let err = cache
            .put(key, json!(1), Duration::ZERO)
            .await
            .expect_err("must fail");
        assert_eq!(err, ConfigError::ZeroCacheTtl);
    }

    #[tokio::test]
    async fn invalidate_removes_one_key() {
        let cache = CacheStore::new();
        let first = fingerprint("latest_rates");
        let second = fingerprint("pair_rate");

        cache
            .put(first.clone(), json!(1), Duration::from_secs(60))
            .await
            .expect("valid ttl");
        cache
            .put(second.clone(), json!(2), Duration::from_secs(60))
            .await
            .expect("valid ttl");

        assert!(cache.invalidate(&first).await);
        assert!(!cache.invalidate(&first).await);
        assert!(cache.get(&second).await.is_some());
    }

    #[tokio::test]
    async fn purge_expired_counts_evictions() {
        let cache = CacheStore::new();

        cache
            .put(fingerprint("short"), json!(1), Duration::from_millis(20))
            .await
            .expect("valid ttl");
        cache
            .put(fingerprint("long"), json!(2), Duration::from_secs(60))
            .await
            .expect("valid ttl");

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn stats_split_live_and_expired() {
        let cache = CacheStore::new();

        cache
            .put(fingerprint("short"), json!(1), Duration::from_millis(20))
            .await
            .expect("valid ttl");
        cache
            .put(fingerprint("long"), json!(2), Duration::from_secs(60))
            .await
            .expect("valid ttl");

        tokio::time::sleep(Duration::from_millis(40)).await;
        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.live_entries, 1);
        assert_eq!(stats.expired_entries, 1);
    }

    #[tokio::test]
    async fn clear_reports_removed_count() {
        let cache = CacheStore::new();
        cache
            .put(fingerprint("a"), json!(1), Duration::from_secs(60))
            .await
            .expect("valid ttl");
        cache
            .put(fingerprint("b"), json!(2), Duration::from_secs(60))
            .await
            .expect("valid ttl");

        assert_eq!(cache.clear().await, 2);
        assert!(cache.is_empty().await);
    }
}
