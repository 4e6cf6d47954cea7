//! HTTP server initialization and runtime setup.
//!
//! Handles backend selection, background task spawning, and the Axum server
//! lifecycle.

use crate::application::services::{LinkService, RateLimiter};
use crate::config::Config;
use crate::domain::access_event::access_channel;
use crate::domain::access_worker::run_access_worker;
use crate::domain::expiry_sweeper::{run_expiry_sweeper, sweep_expired};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{
    CacheService, MemoryCache, NullCache, RedisCache, connect_manager,
};
use crate::infrastructure::persistence::{MemoryLinkRepository, PgLinkRepository};
use crate::infrastructure::rate_limit::{
    MemoryRateLimitStore, RateLimitStore, RedisRateLimitStore,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

/// How often in-memory cache entries and rate windows are purged.
const MEMORY_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// How long shutdown waits for queued access events to be applied.
const ACCESS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Durable store (PostgreSQL with migrations, or in-memory)
/// - Resolution cache and rate-limit store (Redis, or in-memory)
/// - Background access worker and expiry sweeper
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let links = connect_store(&config).await?;
    let redis = connect_redis(&config).await;

    let cache = build_cache(&config, redis.clone());
    let rate_store = build_rate_store(redis);

    let (access_tx, access_rx) = access_channel(config.access_queue_capacity);
    let worker = tokio::spawn(run_access_worker(
        access_rx,
        links.clone(),
        config.access_worker_concurrency,
    ));
    tracing::info!("Access worker started");

    let sweeper = tokio::spawn(run_expiry_sweeper(links.clone(), config.sweep_interval()));

    let link_service = Arc::new(LinkService::new(
        links,
        cache,
        config.code_generator(),
        access_tx,
        config.link_settings(),
    ));
    let rate_limiter = config
        .rate_limit_policy()
        .map(|policy| Arc::new(RateLimiter::new(rate_store, policy)));

    let state = AppState::new(link_service, rate_limiter, config.behind_proxy);
    let app = NormalizePathLayer::trim_trailing_slash().layer(app_router(state));

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();

    // The router, and with it the last access sender, is gone; the worker
    // finishes once the queue is drained.
    match tokio::time::timeout(ACCESS_DRAIN_TIMEOUT, worker).await {
        Ok(_) => tracing::info!("Access worker drained"),
        Err(_) => tracing::warn!("Timed out draining access queue, pending updates lost"),
    }

    Ok(())
}

/// Deletes every expired link once and returns the number removed.
///
/// Used by the `sweep` subcommand for cron-driven deployments.
///
/// # Errors
///
/// Returns an error if the store cannot be reached or the delete fails.
pub async fn sweep_once(config: Config) -> Result<u64> {
    let links = connect_store(&config).await?;
    let removed = sweep_expired(links.as_ref(), chrono::Utc::now()).await?;
    Ok(removed)
}

async fn connect_store(config: &Config) -> Result<Arc<dyn LinkRepository>> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("No database configured, links are kept in memory");
        return Ok(Arc::new(MemoryLinkRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Some(Duration::from_secs(config.db_idle_timeout)))
        .max_lifetime(Some(Duration::from_secs(config.db_max_lifetime)))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    Ok(Arc::new(PgLinkRepository::new(Arc::new(pool))))
}

async fn connect_redis(config: &Config) -> Option<ConnectionManager> {
    let redis_url = config.redis_url.as_deref()?;

    match connect_manager(redis_url).await {
        Ok(manager) => Some(manager),
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using in-memory backends.", e);
            None
        }
    }
}

fn build_cache(config: &Config, redis: Option<ConnectionManager>) -> Arc<dyn CacheService> {
    let ttl = Duration::from_secs(config.cache_ttl_seconds);

    if !config.cache_enabled {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    }

    match redis {
        Some(manager) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(RedisCache::new(manager, ttl))
        }
        None => {
            tracing::info!("Cache enabled (in-memory)");
            let cache = MemoryCache::new(ttl);

            let purged = cache.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(MEMORY_PURGE_INTERVAL);
                loop {
                    ticker.tick().await;
                    purged.purge_expired();
                }
            });

            Arc::new(cache)
        }
    }
}

fn build_rate_store(redis: Option<ConnectionManager>) -> Arc<dyn RateLimitStore> {
    match redis {
        Some(manager) => Arc::new(RedisRateLimitStore::new(manager)),
        None => {
            let store = MemoryRateLimitStore::new();

            let cleaned = store.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(MEMORY_PURGE_INTERVAL);
                loop {
                    ticker.tick().await;
                    cleaned.cleanup();
                }
            });

            Arc::new(store)
        }
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
