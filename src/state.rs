//! Shared state handed to every handler and middleware.

use std::sync::Arc;

use crate::application::services::{LinkService, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    /// `None` when rate limiting is disabled.
    pub rate_limiter: Option<Arc<RateLimiter>>,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for client identity.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        rate_limiter: Option<Arc<RateLimiter>>,
        behind_proxy: bool,
    ) -> Self {
        Self {
            link_service,
            rate_limiter,
            behind_proxy,
        }
    }
}
