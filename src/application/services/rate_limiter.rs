//! Per-client fixed-window rate limiting with temporary blacklisting.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::infrastructure::rate_limit::RateLimitStore;

/// Limits applied to every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Requests allowed per window.
    pub max_requests: u64,
    /// Length of the counting window.
    pub window: Duration,
    /// How long a client stays denied after exceeding the limit.
    pub blacklist_duration: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            blacklist_duration: Duration::from_secs(3600),
        }
    }
}

/// Outcome of admitting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u64 },
    /// This request crossed the limit; the client has just been blacklisted.
    Limited,
    /// The client was already blacklisted.
    Blacklisted,
}

/// Admission gate for the public API.
///
/// Counts and deny flags live in a [`RateLimitStore`]. If that store fails
/// the request is let through.
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Admits or rejects one request from `client`.
    ///
    /// A blacklisted client is rejected without touching its counter. The
    /// request that pushes the window count past the limit is rejected and
    /// triggers the blacklist.
    pub async fn check(&self, client: &str) -> RateDecision {
        match self.store.is_blacklisted(client).await {
            Ok(true) => return RateDecision::Blacklisted,
            Ok(false) => {}
            Err(e) => {
                warn!(client, error = %e, "Blacklist lookup failed, allowing request");
                return self.fail_open();
            }
        }

        let count = match self.store.increment(client, self.policy.window).await {
            Ok(count) => count,
            Err(e) => {
                warn!(client, error = %e, "Rate counter update failed, allowing request");
                return self.fail_open();
            }
        };

        if count <= self.policy.max_requests {
            return RateDecision::Allowed {
                remaining: self.policy.max_requests - count,
            };
        }

        if let Err(e) = self
            .store
            .blacklist(client, self.policy.blacklist_duration)
            .await
        {
            warn!(client, error = %e, "Failed to blacklist client");
        } else {
            info!(
                client,
                count,
                blacklist_seconds = self.policy.blacklist_duration.as_secs(),
                "Client exceeded rate limit, blacklisted"
            );
        }

        RateDecision::Limited
    }

    fn fail_open(&self) -> RateDecision {
        metrics::counter!("tinylink_rate_limit_store_errors_total").increment(1);
        RateDecision::Allowed {
            remaining: self.policy.max_requests,
        }
    }
}
