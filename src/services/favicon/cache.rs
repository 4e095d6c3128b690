//! TTL cache of favicon lookup outcomes

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// A cached lookup outcome. An empty `value` records "no favicon".
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    pub expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Origin -> outcome map with a fixed time-to-live.
///
/// Each operation takes the lock only for the map access itself.
#[derive(Debug)]
pub struct FaviconCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaviconCacheStats {
    pub entries: usize,
    pub expired: usize,
    pub negative: usize,
}

impl FaviconCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Cached value for an origin if it has not expired.
    ///
    /// An expired entry is evicted on the way out.
    pub async fn get(&self, origin: &str) -> Option<String> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(origin) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Another task may have refreshed the entry between the two locks
        let fresh = entries
            .get(origin)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone());
        if fresh.is_none() {
            entries.remove(origin);
        }
        fresh
    }

    /// Store an outcome; a later write for the same origin simply replaces it.
    ///
    /// Expired entries for other origins are swept at the same time, so the
    /// map never outgrows the set of origins looked up within one TTL.
    pub async fn insert(&self, origin: String, value: String) {
        let now = Instant::now();
        let entry = CacheEntry {
            value,
            expires_at: now + self.ttl,
        };
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.insert(origin, entry);
    }

    pub async fn remove(&self, origin: &str) -> bool {
        self.entries.write().await.remove(origin).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Drop expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub async fn stats(&self) -> FaviconCacheStats {
        let now = Instant::now();
        let entries = self.entries.read().await;
        FaviconCacheStats {
            entries: entries.len(),
            expired: entries.values().filter(|e| e.is_expired(now)).count(),
            negative: entries.values().filter(|e| e.value.is_empty()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = FaviconCache::new(Duration::from_secs(60));
        cache
            .insert("https://a.test".into(), "https://a.test/favicon.ico".into())
            .await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(
            cache.get("https://a.test").await.as_deref(),
            Some("https://a.test/favicon.ico")
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("https://a.test").await, None);
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_sweeps_expired_origins() {
        let cache = FaviconCache::new(Duration::from_secs(10));
        for i in 0..5 {
            cache.insert(format!("https://gone{i}.test"), String::new()).await;
        }
        tokio::time::advance(Duration::from_secs(10)).await;

        cache.insert("https://fresh.test".into(), String::new()).await;
        let stats = cache.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.expired, 0);
    }

    #[tokio::test]
    async fn test_negative_outcomes_are_cached() {
        let cache = FaviconCache::new(Duration::from_secs(60));
        cache.insert("https://b.test".into(), String::new()).await;

        assert_eq!(cache.get("https://b.test").await.as_deref(), Some(""));
        let stats = cache.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.negative, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = FaviconCache::new(Duration::from_secs(10));
        cache.insert("https://old.test".into(), String::new()).await;
        cache.insert("https://new.test".into(), String::new()).await;
        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(cache.stats().await.expired, 2);
        assert_eq!(cache.purge_expired().await, 2);
        assert_eq!(cache.stats().await.entries, 0);
        assert_eq!(cache.purge_expired().await, 0);

        cache.insert("https://new.test".into(), String::new()).await;
        assert!(cache.remove("https://new.test").await);
        assert!(!cache.remove("https://new.test").await);
    }
}
