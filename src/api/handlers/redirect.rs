//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /shorten/{code}`
///
/// # Request Flow
///
/// 1. Look the code up in the resolution cache
/// 2. **Hit**: queue an access event for the background worker
/// 3. **Miss** (or cache error): read the store, populate the cache and
///    increment the access count inline
/// 4. Return `302 Found` with `Location` set to the long URL
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist or has expired.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let long_url = state.link_service.resolve(&code).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location(&long_url)?)]).into_response())
}

/// Builds the `Location` header value.
///
/// URLs with non-ASCII characters are sent in their percent-encoded form.
fn location(long_url: &str) -> Result<HeaderValue, AppError> {
    if let Ok(value) = HeaderValue::from_str(long_url) {
        return Ok(value);
    }

    url::Url::parse(long_url)
        .ok()
        .and_then(|parsed| HeaderValue::from_str(parsed.as_str()).ok())
        .ok_or_else(|| {
            AppError::bad_request(
                "Stored URL cannot be used as a redirect target",
                json!({ "url": long_url }),
            )
        })
}
