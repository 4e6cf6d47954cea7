//! Redis-backed rate-limit store.

use super::store::{RateLimitResult, RateLimitStore};
use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use std::time::Duration;
use tracing::debug;

/// Rate-limit state shared by every replica through Redis.
///
/// Counters live under `rate:<client>` and deny flags under
/// `blacklist:<client>`, both with native key expiry.
pub struct RedisRateLimitStore {
    client: ConnectionManager,
}

impl RedisRateLimitStore {
    pub fn new(client: ConnectionManager) -> Self {
        Self { client }
    }

    fn counter_key(client: &str) -> String {
        format!("rate:{}", client)
    }

    fn blacklist_key(client: &str) -> String {
        format!("blacklist:{}", client)
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn is_blacklisted(&self, client: &str) -> RateLimitResult<bool> {
        let mut conn = self.client.clone();
        let blocked = conn
            .exists::<_, bool>(Self::blacklist_key(client))
            .await?;
        Ok(blocked)
    }

    async fn increment(&self, client: &str, window: Duration) -> RateLimitResult<u64> {
        let key = Self::counter_key(client);
        let mut conn = self.client.clone();

        // The window's key is created with its expiry in the same transaction
        // as the increment, so a counter can never be left without a TTL.
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(0)
            .arg("NX")
            .arg("EX")
            .arg(window.as_secs().max(1))
            .ignore()
            .incr(&key, 1)
            .query_async(&mut conn)
            .await?;

        if count == 1 {
            debug!(client, "Rate limit window opened");
        }

        Ok(count)
    }

    async fn blacklist(&self, client: &str, duration: Duration) -> RateLimitResult<()> {
        let mut conn = self.client.clone();
        conn.set_ex::<_, _, ()>(Self::blacklist_key(client), 1, duration.as_secs().max(1))
            .await?;
        Ok(())
    }
}
