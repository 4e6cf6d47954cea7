//! Backends for per-client request counters and deny flags.
//!
//! - [`RedisRateLimitStore`] - shared across replicas
//! - [`MemoryRateLimitStore`] - per process, used when Redis is not configured

mod memory_store;
mod redis_store;
mod store;

pub use memory_store::MemoryRateLimitStore;
pub use redis_store::RedisRateLimitStore;
pub use store::{RateLimitError, RateLimitResult, RateLimitStore};

#[cfg(test)]
pub use store::MockRateLimitStore;
