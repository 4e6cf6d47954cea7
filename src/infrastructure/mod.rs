//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain and application
//! layers.
//!
//! # Modules
//!
//! - [`cache`] - Resolution cache (Redis, in-memory and no-op implementations)
//! - [`persistence`] - Durable link stores (PostgreSQL and in-memory)
//! - [`rate_limit`] - Per-client counters and deny flags (Redis and in-memory)

pub mod cache;
pub mod persistence;
pub mod rate_limit;
