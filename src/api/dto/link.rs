//! DTOs for the `/shorten` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Link;

/// Body of `POST /shorten` and `PUT /shorten/{code}`.
#[derive(Debug, Deserialize, Validate)]
pub struct LinkRequest {
    /// Destination URL (must be absolute HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
}

/// A short link as returned by every `/shorten` endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: i64,
    pub url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub access_count: i64,
    pub expires_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            url: link.long_url,
            short_code: link.code,
            created_at: link.created_at,
            updated_at: link.updated_at,
            access_count: link.access_count,
            expires_at: link.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewLink;

    #[test]
    fn test_link_response_uses_camel_case() {
        let link = NewLink::new(
            "Xy19Ab".to_string(),
            "https://example.com".to_string(),
            Utc::now(),
            chrono::Duration::days(30),
        )
        .into_link(7);

        let value = serde_json::to_value(LinkResponse::from(link)).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["url"], "https://example.com");
        assert_eq!(value["shortCode"], "Xy19Ab");
        assert_eq!(value["accessCount"], 0);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("expiresAt").is_some());
    }

    #[test]
    fn test_link_request_validation() {
        let ok = LinkRequest {
            url: "https://example.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LinkRequest {
            url: "not a url".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
