//! In-memory implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Link store held in process memory.
///
/// One reader/writer lock guards the whole map: lookups share it, mutations
/// take it exclusively. Every instance is independent, so tests can run
/// side by side without sharing state. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryLinkRepository {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    links: HashMap<String, Link>,
    last_id: i64,
}

impl Inner {
    fn allocate_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub async fn len(&self) -> usize {
        self.inner.read().await.links.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.links.is_empty()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn next_id(&self) -> Result<i64, AppError> {
        Ok(self.inner.write().await.allocate_id())
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut inner = self.inner.write().await;

        if inner.links.contains_key(&new_link.code) {
            return Err(AppError::DuplicateCode {
                code: new_link.code,
            });
        }

        let id = match new_link.id {
            Some(id) => {
                inner.last_id = inner.last_id.max(id);
                id
            }
            None => inner.allocate_id(),
        };

        let link = new_link.into_link(id);
        inner.links.insert(link.code.clone(), link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.inner.read().await.links.get(code).cloned())
    }

    async fn save(&self, link: &Link) -> Result<Option<Link>, AppError> {
        let mut inner = self.inner.write().await;

        let Some(stored) = inner
            .links
            .get_mut(&link.code)
            .filter(|stored| stored.id == link.id)
        else {
            return Ok(None);
        };

        stored.long_url = link.long_url.clone();
        stored.updated_at = link.updated_at;

        Ok(Some(stored.clone()))
    }

    async fn increment_access_count(&self, code: &str) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;

        match inner.links.get_mut(code) {
            Some(link) => {
                link.access_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_code(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.inner.write().await.links.remove(code).is_some())
    }

    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut inner = self.inner.write().await;

        let before = inner.links.len();
        inner.links.retain(|_, link| link.expires_at > now);

        Ok((before - inner.links.len()) as u64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
