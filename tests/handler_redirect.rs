mod common;

use axum::http::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_redirect_success() {
    let ctx = common::create_test_state(None);
    let server = common::test_server(ctx.state.clone());

    common::create_test_link(&ctx.links, "redir1", "https://example.com/target").await;

    let response = server.get("/shorten/redir1").await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let ctx = common::create_test_state(None);
    let server = common::test_server(ctx.state.clone());

    let response = server.get("/shorten/nonexistent").await;

    response.assert_status_not_found();

    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "not_found");
    assert_eq!(json["error"]["message"], "Short URL not found");
}

#[tokio::test]
async fn test_redirect_expired_link_is_not_found() {
    let ctx = common::create_test_state(None);
    let server = common::test_server(ctx.state.clone());

    common::create_expired_link(&ctx.links, "old123", "https://example.com").await;

    let response = server.get("/shorten/old123").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_populates_cache_and_counts_inline() {
    let ctx = common::create_test_state(None);
    let server = common::test_server(ctx.state.clone());

    common::create_test_link(&ctx.links, "miss01", "https://example.com").await;
    assert!(ctx.cache.is_empty());

    server.get("/shorten/miss01").await;

    assert_eq!(ctx.cache.len(), 1);

    let response = server.get("/shorten/miss01/stats").await;
    assert_eq!(response.json::<Value>()["accessCount"], 1);
}

#[tokio::test]
async fn test_redirect_cache_hit_counts_asynchronously() {
    let ctx = common::create_test_state(None);
    let server = common::test_server(ctx.state.clone());

    common::create_test_link(&ctx.links, "hit001", "https://example.com").await;

    for _ in 0..5 {
        let response = server.get("/shorten/hit001").await;
        assert_eq!(response.status_code(), StatusCode::FOUND);
        assert_eq!(response.header("location"), "https://example.com");
    }

    let count = common::wait_for_access_count(&ctx.links, "hit001", 5).await;
    assert_eq!(count, 5);
}

#[tokio::test]
async fn test_redirect_malformed_code_is_not_found() {
    let ctx = common::create_test_state(None);
    let server = common::test_server(ctx.state.clone());

    let response = server.get("/shorten/bad%20code").await;

    response.assert_status_not_found();
}
