//! Repository trait for the durable link store.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Authoritative storage for short links.
///
/// All methods must be safe to call concurrently. Uniqueness of `code` is
/// enforced by the store itself.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Reserves a fresh identifier for a link that has not been inserted yet.
    ///
    /// Used when the short code is derived from the identifier.
    async fn next_id(&self) -> Result<i64, AppError>;

    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateCode`] if the code is already taken.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Persists the mutable fields (`long_url`, `updated_at`) of an existing link.
    ///
    /// Last writer wins. Returns `Ok(None)` if the row no longer exists.
    async fn save(&self, link: &Link) -> Result<Option<Link>, AppError>;

    /// Atomically adds one to the access counter.
    ///
    /// Returns `Ok(false)` if no link has this code.
    async fn increment_access_count(&self, code: &str) -> Result<bool, AppError>;

    /// Deletes a link by code. Returns `Ok(false)` if it did not exist.
    async fn delete_by_code(&self, code: &str) -> Result<bool, AppError>;

    /// Deletes every link with `expires_at <= now` and returns how many were removed.
    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
