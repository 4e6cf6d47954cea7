//! Domain layer containing business entities and background processes.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`access_event`] - Deferred access-count event and its queue
//! - [`access_worker`] - Asynchronous access-count processing
//! - [`expiry_sweeper`] - Periodic purge of expired links
//!
//! # Access Counting Flow
//!
//! 1. A resolution is served from the cache
//! 2. An [`access_event::AccessEvent`] is pushed onto the bounded queue
//! 3. [`access_worker::run_access_worker`] applies the increment with retries
//!
//! Cache misses increment inline because the store was already consulted.

pub mod access_event;
pub mod access_worker;
pub mod entities;
pub mod expiry_sweeper;
pub mod repositories;
