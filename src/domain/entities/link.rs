//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Duration, Utc};

/// A shortened URL with its access statistics and retention deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub access_count: i64,
    pub expires_at: DateTime<Utc>,
}

impl Link {
    /// Returns true once `now` has reached the retention deadline.
    ///
    /// Expired links are eligible for the sweeper and are treated as absent
    /// by the resolution path even before they are purged.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left until the link expires, or `None` if it already has.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        (self.expires_at - now).to_std().ok().filter(|d| !d.is_zero())
    }
}

/// Input data for creating a new link.
///
/// `id` is set only when the short code was derived from a pre-reserved
/// identifier; otherwise the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub id: Option<i64>,
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewLink {
    /// Builds a link that expires `retention` after `created_at`.
    pub fn new(
        code: String,
        long_url: String,
        created_at: DateTime<Utc>,
        retention: Duration,
    ) -> Self {
        Self {
            id: None,
            code,
            long_url,
            created_at,
            expires_at: created_at + retention,
        }
    }

    /// Pins the row to an identifier obtained from the store beforehand.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Materializes the stored record with a zero access count.
    pub fn into_link(self, id: i64) -> Link {
        Link {
            id,
            code: self.code,
            long_url: self.long_url,
            created_at: self.created_at,
            updated_at: self.created_at,
            access_count: 0,
            expires_at: self.expires_at,
        }
    }
}
