//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::link::{LinkRequest, LinkResponse};
use crate::api::extract::ValidatedJson;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// `201 Created` with the stored record:
///
/// ```json
/// {
///   "id": 1,
///   "url": "https://example.com",
///   "shortCode": "Xy19Ab",
///   "createdAt": "2025-01-01T00:00:00Z",
///   "updatedAt": "2025-01-01T00:00:00Z",
///   "accessCount": 0,
///   "expiresAt": "2025-01-31T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for a malformed body or an invalid URL.
/// Returns 500 Internal Server Error if the store fails or no free code is found.
pub async fn shorten_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let link = state.link_service.create_short_link(payload.url).await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}
