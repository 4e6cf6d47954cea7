//! Application layer services implementing business logic.
//!
//! Services coordinate repositories, the resolution cache and the access
//! queue, and give HTTP handlers a narrow API to call.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link lifecycle and resolution
//! - [`services::rate_limiter::RateLimiter`] - Per-client admission control

pub mod services;
