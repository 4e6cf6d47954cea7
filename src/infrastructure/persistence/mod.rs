//! Durable store implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - PostgreSQL, the production store
//! - [`MemoryLinkRepository`] - in-process map, used when no database is configured

pub mod memory_link_repository;
pub mod pg_link_repository;

pub use memory_link_repository::MemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
