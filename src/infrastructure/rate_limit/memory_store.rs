//! In-process rate-limit store.

use super::store::{RateLimitResult, RateLimitStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Fixed-window counters and deny flags held in memory.
///
/// Used when Redis is not configured. Limits are per process, so several
/// replicas each enforce their own budget.
#[derive(Clone, Default)]
pub struct MemoryRateLimitStore {
    counters: Arc<DashMap<String, (u64, Instant)>>,
    blacklist: Arc<DashMap<String, Instant>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes expired windows and deny flags.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.counters.retain(|_, (_, expires_at)| *expires_at > now);
        self.blacklist.retain(|_, expires_at| *expires_at > now);
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn is_blacklisted(&self, client: &str) -> RateLimitResult<bool> {
        let now = Instant::now();

        let blocked = self
            .blacklist
            .get(client)
            .is_some_and(|expires_at| *expires_at > now);

        if !blocked {
            self.blacklist
                .remove_if(client, |_, expires_at| *expires_at <= now);
        }

        Ok(blocked)
    }

    async fn increment(&self, client: &str, window: Duration) -> RateLimitResult<u64> {
        let now = Instant::now();

        let mut entry = self
            .counters
            .entry(client.to_string())
            .or_insert((0, now + window));
        let (count, expires_at) = entry.value_mut();

        if *expires_at <= now {
            *count = 0;
            *expires_at = now + window;
        }

        *count += 1;
        Ok(*count)
    }

    async fn blacklist(&self, client: &str, duration: Duration) -> RateLimitResult<()> {
        self.blacklist
            .insert(client.to_string(), Instant::now() + duration);
        Ok(())
    }
}
