//! API route configuration.
//!
//! Every route here sits behind [`crate::api::middleware::rate_limit`].

use crate::api::handlers::{
    delete_link_handler, redirect_handler, shorten_handler, stats_handler, update_link_handler,
};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Public link routes, rate limited per client.
///
/// # Endpoints
///
/// - `POST   /shorten`              - Create a short link
/// - `GET    /shorten/{code}`       - Redirect to the long URL
/// - `PUT    /shorten/{code}`       - Replace the long URL
/// - `DELETE /shorten/{code}`       - Delete the link
/// - `GET    /shorten/{code}/stats` - Stored record with access count
pub fn link_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route(
            "/shorten/{code}",
            get(redirect_handler)
                .put(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/shorten/{code}/stats", get(stats_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit::layer))
}
