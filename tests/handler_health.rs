mod common;

use axum::http::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_health_endpoint_success() {
    let ctx = common::create_test_state(None);
    let server = common::test_server(ctx.state.clone());

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["store"]["status"], "ok");
    assert_eq!(json["checks"]["access_queue"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = common::create_test_state(None);
    let server = common::test_server(ctx.state.clone());

    let json = server.get("/health").await.json::<Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json["checks"].get("store").is_some());
    assert!(json["checks"].get("access_queue").is_some());
    assert!(json["checks"].get("cache").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_access_queue_closed() {
    let server = common::test_server(common::create_state_with_closed_queue());

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["access_queue"]["status"], "error");
}
