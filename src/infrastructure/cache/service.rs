//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        Self::OperationError(e.to_string())
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Short code to long URL cache sitting in front of the durable store.
///
/// The cache is never authoritative. Callers treat every error as a miss and
/// fall back to the store, so implementations report failures instead of
/// hiding them.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the long URL for a short code.
    ///
    /// Returns `Ok(None)` on a miss or an expired entry.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Stores (or overwrites) a mapping.
    ///
    /// `ttl` of `None` applies the implementation's default TTL.
    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<()>;

    /// Removes a cached mapping. Removing an absent key is not an error.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
