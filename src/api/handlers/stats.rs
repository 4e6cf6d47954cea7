//! Handler for link statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::link::LinkResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the stored record of a short link, access count included.
///
/// # Endpoint
///
/// `GET /shorten/{code}/stats`
///
/// Read from the durable store. Increments still queued behind cache hits
/// show up once the background worker has applied them.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist or has expired.
pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_stats(&code).await?;

    Ok(Json(link.into()))
}
