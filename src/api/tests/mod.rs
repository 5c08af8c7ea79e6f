use super::*;
use crate::orchestrator::test_helpers::{TestHarness, create_test_orchestrator};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;


/// Router over a test orchestrator, plus the harness for inspecting the fakes
async fn create_test_app() -> (Router, TestHarness) {
    let harness = create_test_orchestrator().await;
    let config = harness.orchestrator.get_config();
    let app = create_router(Arc::new(harness.orchestrator.clone()), config);
    (app, harness)
}

/// Router with a custom configuration
async fn create_test_app_with(configure: impl FnOnce(&mut Config)) -> (Router, TestHarness) {
    let harness = create_test_orchestrator().await;
    let mut config = (*harness.orchestrator.get_config()).clone();
    configure(&mut config);
    let app = create_router(Arc::new(harness.orchestrator.clone()), Arc::new(config));
    (app, harness)
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_api_server_spawns_and_stops_on_cancel() {
    let harness = create_test_orchestrator().await;

    let mut config = (*harness.orchestrator.get_config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // OS assigns a free port
    let config = Arc::new(config);

    let token = CancellationToken::new();
    let api_handle = tokio::spawn({
        let orchestrator = Arc::new(harness.orchestrator.clone());
        let token = token.clone();
        async move { start_api_server_with_shutdown(orchestrator, config, token).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    token.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), api_handle)
        .await
        .expect("server did not stop after cancellation")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _harness) = create_test_app_with(|config| {
        config.server.api.cors_enabled = true;
        config.server.api.cors_origins = vec!["*".to_string()];
    })
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (app, _harness) = create_test_app_with(|config| {
        config.server.api.cors_enabled = false;
    })
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_api_key_protects_every_route() {
    let (app, _harness) = create_test_app_with(|config| {
        config.server.api.api_key = Some("hook-secret".to_string());
    })
    .await;

    let request = Request::builder()
        .method("POST")
        .uri("/torrent-finished")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/torrent-finished?api_key=hook-secret")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/status")
        .header("X-Api-Key", "hook-secret")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (app, _harness) = create_test_app_with(|config| {
        config.server.api.swagger_ui = false;
    })
    .await;

    let request = Request::builder()
        .uri("/swagger-ui/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_swagger_ui_document_does_not_shadow_openapi_route() {
    let (app, _harness) = create_test_app().await;

    for uri in ["/openapi.json", "/api-docs/openapi.json"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let json = json_body(response).await;
        assert!(json["paths"]["/campaigns"].is_object(), "{}", uri);
    }
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let (app, _harness) = create_test_app().await;

    let request = Request::builder()
        .uri("/nonexistent")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
