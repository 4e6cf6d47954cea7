#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{Duration as ChronoDuration, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tinylink::application::services::{LinkService, LinkSettings, RateLimitPolicy, RateLimiter};
use tinylink::domain::access_event::{AccessSender, access_channel};
use tinylink::domain::access_worker::run_access_worker;
use tinylink::domain::entities::{Link, NewLink};
use tinylink::domain::repositories::LinkRepository;
use tinylink::infrastructure::cache::MemoryCache;
use tinylink::infrastructure::persistence::MemoryLinkRepository;
use tinylink::infrastructure::rate_limit::MemoryRateLimitStore;
use tinylink::routes::app_router;
use tinylink::state::AppState;
use tinylink::utils::code_generator::CodeGenerator;
use tokio::task::JoinHandle;
use tower::Layer;

/// Handles into the in-memory backends behind a test server.
pub struct TestContext {
    pub state: AppState,
    pub links: Arc<MemoryLinkRepository>,
    pub cache: MemoryCache,
    pub worker: JoinHandle<()>,
}

pub fn create_test_state(rate_limit: Option<RateLimitPolicy>) -> TestContext {
    let links = Arc::new(MemoryLinkRepository::new());
    let cache = MemoryCache::new(Duration::from_secs(600));

    let (tx, rx) = access_channel(100);
    let worker = tokio::spawn(run_access_worker(rx, links.clone(), 4));

    let state = build_state(links.clone(), cache.clone(), tx, rate_limit);

    TestContext {
        state,
        links,
        cache,
        worker,
    }
}

/// State whose access worker is already gone.
pub fn create_state_with_closed_queue() -> AppState {
    let (tx, rx) = access_channel(100);
    drop(rx);

    build_state(
        Arc::new(MemoryLinkRepository::new()),
        MemoryCache::new(Duration::from_secs(600)),
        tx,
        None,
    )
}

fn build_state(
    links: Arc<MemoryLinkRepository>,
    cache: MemoryCache,
    tx: AccessSender,
    rate_limit: Option<RateLimitPolicy>,
) -> AppState {
    let link_service = Arc::new(LinkService::new(
        links,
        Arc::new(cache),
        CodeGenerator::random(),
        tx,
        LinkSettings::default(),
    ));

    let rate_limiter = rate_limit
        .map(|policy| Arc::new(RateLimiter::new(Arc::new(MemoryRateLimitStore::new()), policy)));

    AppState::new(link_service, rate_limiter, true)
}

pub fn test_server(state: AppState) -> TestServer {
    let app = app_router(state).layer(MockConnectInfoLayer);
    TestServer::new(app).unwrap()
}

pub async fn create_test_link(links: &MemoryLinkRepository, code: &str, url: &str) -> Link {
    links
        .insert(NewLink::new(
            code.to_string(),
            url.to_string(),
            Utc::now(),
            ChronoDuration::days(30),
        ))
        .await
        .unwrap()
}

pub async fn create_expired_link(links: &MemoryLinkRepository, code: &str, url: &str) -> Link {
    links
        .insert(NewLink::new(
            code.to_string(),
            url.to_string(),
            Utc::now() - ChronoDuration::days(31),
            ChronoDuration::days(30),
        ))
        .await
        .unwrap()
}

/// Polls until the background worker has caught up, returning the last count seen.
pub async fn wait_for_access_count(links: &MemoryLinkRepository, code: &str, expected: i64) -> i64 {
    let mut count = 0;

    for _ in 0..200 {
        count = links
            .find_by_code(code)
            .await
            .unwrap()
            .map(|link| link.access_count)
            .unwrap_or_default();

        if count >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    count
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
