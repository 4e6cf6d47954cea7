//! In-process cache with per-entry TTL.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Thread-safe in-memory cache mapping short codes to long URLs.
///
/// Used when Redis is not configured. Expired entries are dropped lazily on
/// lookup and in bulk by [`MemoryCache::purge_expired`].
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, (String, Instant)>>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    /// Drops every entry whose deadline has passed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, (_, deadline)| *deadline > now);
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();

        let hit = self
            .entries
            .get(short_code)
            .filter(|entry| entry.1 > now)
            .map(|entry| entry.0.clone());

        if hit.is_none() {
            self.entries
                .remove_if(short_code, |_, (_, deadline)| *deadline <= now);
            debug!("Cache MISS: {}", short_code);
        }

        Ok(hit)
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let deadline = Instant::now() + ttl.unwrap_or(self.default_ttl);
        self.entries.insert(
            short_code.to_string(),
            (original_url.to_string(), deadline),
        );
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.entries.remove(short_code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new(Duration::from_secs(600));

        cache
            .set_url("abc123", "https://example.com", Some(Duration::from_secs(10)))
            .await
            .unwrap();
        assert_eq!(
            cache.get_url("abc123").await.unwrap().as_deref(),
            Some("https://example.com")
        );

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(cache.get_url("abc123").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_ttl_applies() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache
            .set_url("abc123", "https://example.com", None)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get_url("abc123").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get_url("abc123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_value() {
        let cache = MemoryCache::new(Duration::from_secs(60));

        cache
            .set_url("abc123", "https://old.example.com", None)
            .await
            .unwrap();
        cache
            .set_url("abc123", "https://new.example.com", None)
            .await
            .unwrap();

        assert_eq!(
            cache.get_url("abc123").await.unwrap().as_deref(),
            Some("https://new.example.com")
        );
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache
            .set_url("abc123", "https://example.com", None)
            .await
            .unwrap();

        cache.invalidate("abc123").await.unwrap();
        cache.invalidate("missing").await.unwrap();

        assert_eq!(cache.get_url("abc123").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = MemoryCache::new(Duration::from_secs(60));
        cache
            .set_url("short", "https://a.example.com", Some(Duration::from_secs(5)))
            .await
            .unwrap();
        cache
            .set_url("long", "https://b.example.com", Some(Duration::from_secs(500)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        cache.purge_expired();

        assert_eq!(cache.len(), 1);
    }
}
