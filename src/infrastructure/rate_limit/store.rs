//! Rate-limit store trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors raised by a rate-limit backend.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit store error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for RateLimitError {
    fn from(e: redis::RedisError) -> Self {
        Self::Backend(e.to_string())
    }
}

pub type RateLimitResult<T> = Result<T, RateLimitError>;

/// Ephemeral per-client counters and deny flags.
///
/// Backed by a key-value store with per-key TTL and atomic increment. Nothing
/// here is ever written to the durable store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Returns true while the client's deny flag is alive.
    async fn is_blacklisted(&self, client: &str) -> RateLimitResult<bool>;

    /// Counts one request in the client's current window and returns the new count.
    ///
    /// The window's expiry is set only when the count becomes 1; later hits
    /// never extend it.
    async fn increment(&self, client: &str, window: Duration) -> RateLimitResult<u64>;

    /// Sets the client's deny flag for `duration`.
    async fn blacklist(&self, client: &str, duration: Duration) -> RateLimitResult<()>;
}
