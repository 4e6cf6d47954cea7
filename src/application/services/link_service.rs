//! Link lifecycle and the cache-backed resolution path.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, warn};

use crate::domain::access_event::{AccessEvent, AccessSender};
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{CodeGenerator, generate_random_code, is_well_formed_code};
use crate::utils::url_validator::validate_url;

/// Insert attempts for the random strategy before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Tunables for [`LinkService`].
#[derive(Debug, Clone, Copy)]
pub struct LinkSettings {
    /// How long a link lives after creation.
    pub retention: chrono::Duration,
    /// Upper bound on how long a resolution stays cached.
    pub cache_ttl: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            retention: chrono::Duration::days(30),
            cache_ttl: Duration::from_secs(600),
        }
    }
}

/// Creates, resolves, updates and deletes short links.
///
/// The durable store is authoritative. The cache only shadows `code -> url`
/// and every cache failure degrades to a store read.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    generator: CodeGenerator,
    access_sender: AccessSender,
    settings: LinkSettings,
}

impl LinkService {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        generator: CodeGenerator,
        access_sender: AccessSender,
        settings: LinkSettings,
    ) -> Self {
        Self {
            link_repository,
            cache,
            generator,
            access_sender,
            settings,
        }
    }

    /// Creates a short link for `long_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not an absolute HTTP(S) URL.
    /// Returns [`AppError::GenerationExhausted`] if no free code was found.
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    pub async fn create_short_link(&self, long_url: String) -> Result<Link, AppError> {
        let long_url = checked_url(long_url)?;
        let created_at = Utc::now();

        match &self.generator {
            CodeGenerator::Random { length } => {
                self.insert_with_random_code(long_url, created_at, *length)
                    .await
            }
            CodeGenerator::Encoded(encoder) => {
                let id = self.link_repository.next_id().await?;
                // The 40-bit identifier space is used up.
                let code = encoder
                    .encode(id)
                    .ok_or(AppError::GenerationExhausted { attempts: 1 })?;

                let new_link =
                    NewLink::new(code, long_url, created_at, self.settings.retention).with_id(id);
                self.link_repository.insert(new_link).await
            }
        }
    }

    async fn insert_with_random_code(
        &self,
        long_url: String,
        created_at: chrono::DateTime<Utc>,
        length: usize,
    ) -> Result<Link, AppError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let new_link = NewLink::new(
                generate_random_code(length),
                long_url.clone(),
                created_at,
                self.settings.retention,
            );

            match self.link_repository.insert(new_link).await {
                Ok(link) => return Ok(link),
                Err(AppError::DuplicateCode { code }) => {
                    debug!(attempt, code, "Short code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::GenerationExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Resolves a short code to its long URL and records the access.
    ///
    /// On a cache hit the counter update is queued for the background worker
    /// and the URL is returned immediately. On a miss the store is read, the
    /// cache is populated and the counter is incremented before returning.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown or expired codes.
    /// Returns [`AppError::StoreUnavailable`] if the store cannot be read.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        if !is_well_formed_code(code) {
            return Err(AppError::link_not_found(code));
        }

        match self.cache.get_url(code).await {
            Ok(Some(url)) => {
                metrics::counter!("tinylink_cache_hits_total").increment(1);
                self.dispatch_access(code);
                return Ok(url);
            }
            Ok(None) => {
                metrics::counter!("tinylink_cache_misses_total").increment(1);
            }
            Err(e) => {
                metrics::counter!("tinylink_cache_errors_total").increment(1);
                warn!(code, error = %e, "Cache lookup failed, falling back to store");
            }
        }

        let link = self.find_live(code).await?;

        match self.link_repository.increment_access_count(code).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(code, "Link deleted while resolving");
                return Err(AppError::link_not_found(code));
            }
            Err(e) => warn!(code, error = %e, "Failed to increment access count"),
        }

        if self.cache_link(&link).await {
            self.confirm_cached(&link).await;
        }

        Ok(link.long_url)
    }

    /// Replaces the long URL of an existing link.
    ///
    /// The cache entry is overwritten before returning, so the next resolution
    /// observes the new URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid URL and
    /// [`AppError::NotFound`] for unknown or expired codes.
    pub async fn update_link(&self, code: &str, long_url: String) -> Result<Link, AppError> {
        let long_url = checked_url(long_url)?;

        let mut link = self.find_live(code).await?;
        link.long_url = long_url;
        link.updated_at = Utc::now();

        let saved = self
            .link_repository
            .save(&link)
            .await?
            .ok_or_else(|| AppError::link_not_found(code))?;

        self.cache_link(&saved).await;

        Ok(saved)
    }

    /// Deletes a link and drops its cache entry.
    ///
    /// The entry is dropped on both sides of the store delete, so a resolution
    /// that repopulated it in between is cleared too. A resolution racing with
    /// the delete may still be served once.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code does not exist.
    pub async fn delete_link(&self, code: &str) -> Result<(), AppError> {
        if !is_well_formed_code(code) {
            return Err(AppError::link_not_found(code));
        }

        if let Err(e) = self.cache.invalidate(code).await {
            warn!(code, error = %e, "Failed to invalidate cache before delete");
        }

        if !self.link_repository.delete_by_code(code).await? {
            return Err(AppError::link_not_found(code));
        }

        if let Err(e) = self.cache.invalidate(code).await {
            warn!(code, error = %e, "Failed to invalidate cache after delete");
        }

        Ok(())
    }

    /// Returns the stored record, access count included, straight from the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown or expired codes.
    pub async fn get_stats(&self, code: &str) -> Result<Link, AppError> {
        self.find_live(code).await
    }

    /// Checks that the durable store answers.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }

    /// Checks that the cache backend answers.
    pub async fn check_cache(&self) -> bool {
        self.cache.health_check().await
    }

    /// Free slots in the access queue, or `None` once the worker is gone.
    pub fn access_queue_capacity(&self) -> Option<usize> {
        if self.access_sender.is_closed() {
            None
        } else {
            Some(self.access_sender.capacity())
        }
    }

    async fn find_live(&self, code: &str) -> Result<Link, AppError> {
        if !is_well_formed_code(code) {
            return Err(AppError::link_not_found(code));
        }

        self.link_repository
            .find_by_code(code)
            .await?
            .filter(|link| !link.is_expired(Utc::now()))
            .ok_or_else(|| AppError::link_not_found(code))
    }

    /// Writes `link` to the cache, never past its own expiry.
    ///
    /// If the write fails the entry is dropped instead so a stale URL cannot
    /// outlive an update. Returns whether an entry was written.
    async fn cache_link(&self, link: &Link) -> bool {
        let Some(remaining) = link.remaining_lifetime(Utc::now()) else {
            return false;
        };
        let ttl = self.settings.cache_ttl.min(remaining);

        match self
            .cache
            .set_url(&link.code, &link.long_url, Some(ttl))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(code = %link.code, error = %e, "Failed to populate cache");
                self.drop_cached(&link.code).await;
                false
            }
        }
    }

    /// Re-reads the store after a cache write made from an earlier read.
    ///
    /// An update or delete that committed in between would otherwise leave
    /// its old URL cached until the TTL.
    async fn confirm_cached(&self, link: &Link) {
        let current = match self.link_repository.find_by_code(&link.code).await {
            Ok(current) => current,
            Err(e) => {
                warn!(code = %link.code, error = %e, "Failed to confirm cache entry");
                None
            }
        };

        if current.is_none_or(|current| current.long_url != link.long_url) {
            debug!(code = %link.code, "Link changed while resolving, dropping cache entry");
            self.drop_cached(&link.code).await;
        }
    }

    async fn drop_cached(&self, code: &str) {
        if let Err(e) = self.cache.invalidate(code).await {
            error!(code, error = %e, "Failed to drop cache entry, it may be stale until its TTL");
        }
    }

    fn dispatch_access(&self, code: &str) {
        match self.access_sender.try_send(AccessEvent::new(code)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                metrics::counter!("tinylink_access_events_dropped_total").increment(1);
                warn!(code, "Access queue full, dropping access count update");
            }
            Err(TrySendError::Closed(_)) => {
                metrics::counter!("tinylink_access_events_dropped_total").increment(1);
                warn!(code, "Access worker stopped, dropping access count update");
            }
        }
    }
}

fn checked_url(long_url: String) -> Result<String, AppError> {
    let long_url = long_url.trim().to_string();

    validate_url(&long_url).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    Ok(long_url)
}
