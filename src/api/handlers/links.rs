//! Handlers for link management endpoints (update, delete).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::link::{LinkRequest, LinkResponse};
use crate::api::extract::ValidatedJson;
use crate::error::AppError;
use crate::state::AppState;

/// Replaces the destination of a short link.
///
/// # Endpoint
///
/// `PUT /shorten/{code}`
///
/// # Request Body
///
/// ```json
/// { "url": "https://new-destination.com" }
/// ```
///
/// # Cache
///
/// The cached mapping is overwritten before responding, so the next redirect
/// uses the new destination.
///
/// # Errors
///
/// Returns 400 Bad Request for a malformed body or an invalid URL.
/// Returns 404 Not Found if the link doesn't exist or has expired.
pub async fn update_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.update_link(&code, payload.url).await?;

    Ok(Json(link.into()))
}

/// Permanently deletes a short link.
///
/// # Endpoint
///
/// `DELETE /shorten/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(&code).await?;

    Ok(StatusCode::NO_CONTENT)
}
