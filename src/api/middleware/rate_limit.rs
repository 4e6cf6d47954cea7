//! Per-client rate limiting and blacklist middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use tracing::{debug, warn};

use crate::application::services::RateDecision;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Admits the request if its client is within budget and not blacklisted.
///
/// # Client Identity
///
/// The peer socket address, or the first `X-Forwarded-For` / `X-Real-IP`
/// address when the service runs behind a trusted proxy. Requests whose
/// client cannot be determined are let through.
///
/// # Errors
///
/// - `403 Forbidden` while the client is blacklisted
/// - `429 Too Many Requests` on the request that exceeds the window budget;
///   the body carries `limit` and `time_window` (seconds)
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(limiter) = state.rate_limiter.as_deref() else {
        return Ok(next.run(req).await);
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let Some(ip) = client_ip(req.headers(), peer, state.behind_proxy) else {
        debug!("Client address unknown, skipping rate limit");
        return Ok(next.run(req).await);
    };
    let client = ip.to_string();

    match limiter.check(&client).await {
        RateDecision::Allowed { .. } => Ok(next.run(req).await),
        RateDecision::Limited => {
            metrics::counter!("tinylink_rate_limited_total").increment(1);
            warn!(client, "Rate limit exceeded");

            let policy = limiter.policy();
            Err(AppError::RateLimited {
                limit: policy.max_requests,
                window_seconds: policy.window.as_secs(),
            })
        }
        RateDecision::Blacklisted => {
            metrics::counter!("tinylink_blacklisted_requests_total").increment(1);
            debug!(client, "Rejected blacklisted client");
            Err(AppError::Blacklisted)
        }
    }
}
