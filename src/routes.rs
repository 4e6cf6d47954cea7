//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `/shorten/*` - Link API (rate limited)
//! - `GET /health` - Health check: store, cache, access queue
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client fixed window with blacklist
//! - **Path normalization** - Trailing slash handling, applied in [`crate::server`]

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(api::routes::link_routes(state.clone()))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(tracing::layer())
}
