//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Opens a Redis connection manager and validates it with a PING.
///
/// The manager is cheap to clone and is shared between the cache and the
/// rate-limit store.
///
/// # Errors
///
/// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
/// be established, or the PING health check fails.
pub async fn connect_manager(redis_url: &str) -> CacheResult<ConnectionManager> {
    let client = Client::open(redis_url).map_err(|e| {
        CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
    })?;

    let manager = ConnectionManager::new(client).await.map_err(|e| {
        CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
    })?;

    let mut test_conn = manager.clone();
    test_conn
        .ping::<()>()
        .await
        .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

    info!("Connected to Redis");

    Ok(manager)
}

/// Redis cache for fast URL lookups.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection reuse.
/// Errors are returned to the caller, which degrades them to cache misses.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: Duration,
    key_prefix: String,
}

impl RedisCache {
    /// Wraps an established connection.
    ///
    /// `default_ttl` is applied when [`CacheService::set_url`] is called without
    /// a TTL; controlled via the `CACHE_TTL_SECONDS` env var.
    pub fn new(client: ConnectionManager, default_ttl: Duration) -> Self {
        Self {
            client,
            default_ttl,
            key_prefix: "url:".to_string(),
        }
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, short_code: &str) -> String {
        format!("{}{}", self.key_prefix, short_code)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        let url = conn.get::<_, Option<String>>(&key).await?;
        match &url {
            Some(url) => debug!("Cache HIT: {} -> {}", short_code, url),
            None => debug!("Cache MISS: {}", short_code),
        }

        Ok(url)
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();
        let ttl_millis = expiry_millis(ttl.unwrap_or(self.default_ttl));

        if ttl_millis == 0 {
            debug!("Cache SKIP: {} (TTL under 1ms)", short_code);
            return Ok(());
        }

        conn.pset_ex::<_, _, ()>(&key, original_url, ttl_millis)
            .await?;

        debug!(
            "Cache SET: {} -> {} (TTL: {}ms)",
            short_code, original_url, ttl_millis
        );
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        let deleted = conn.del::<_, i32>(&key).await?;
        if deleted > 0 {
            debug!("Cache INVALIDATE: {}", short_code);
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}

/// Expiry in whole milliseconds, rounded down so an entry never outlives `ttl`.
fn expiry_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}
