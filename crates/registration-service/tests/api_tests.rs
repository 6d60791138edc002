//! Integration tests for the registration service API.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use platform_client::PlatformClient;
use registration_service::{
    api::{create_router, AppState},
    MemoryUserStore, PlatformRegistrar, UserRecord, UserStore,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_json, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a test app backed by a memory store and a mock platform.
fn create_test_app(
    mock_server: &MockServer,
    store: Arc<MemoryUserStore>,
    timeout: Duration,
) -> Router {
    let platform = PlatformClient::new(&mock_server.uri(), "test-api-key", timeout).unwrap();
    let registrar = PlatformRegistrar::new(store, platform, "vendor-1");
    create_router(AppState::new(registrar))
}

fn register_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/register/platform")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn platform_success() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "data": { "safeWalkId": "S1", "sharingCode": "C1" }
    }))
}

#[tokio::test]
async fn test_health_endpoint() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(
        &mock_server,
        Arc::new(MemoryUserStore::new()),
        Duration::from_secs(5),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "memory");
}

#[tokio::test]
async fn test_register_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(header_matcher("x-api-key", "test-api-key"))
        .and(body_json(serde_json::json!({
            "platformUserId": "u1",
            "platformId": "vendor-1"
        })))
        .respond_with(platform_success())
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryUserStore::new());
    let app = create_test_app(&mock_server, store.clone(), Duration::from_secs(5));

    let response = app
        .oneshot(register_request(r#"{"userId": "u1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["message"], "Platform registration successful");
    assert_eq!(json["userId"], "u1");
    assert_eq!(json["sharingCode"], "C1");

    let record = store.get("u1").await.unwrap().unwrap();
    assert_eq!(record.registered_sharing_code(), Some("C1"));
    assert_eq!(record.safe_walk_id.as_deref(), Some("S1"));
}

#[tokio::test]
async fn test_already_registered_does_not_call_platform() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(platform_success())
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryUserStore::new());
    let mut existing = UserRecord::new("u1");
    existing.sharing_code = Some("C1".into());
    store.insert(existing).await;

    let app = create_test_app(&mock_server, store, Duration::from_secs(5));

    let response = app
        .oneshot(register_request(r#"{"userId": "u1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["message"], "User already registered");
    assert_eq!(json["sharingCode"], "C1");
}

#[tokio::test]
async fn test_repeat_request_registers_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(platform_success())
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(
        &mock_server,
        Arc::new(MemoryUserStore::new()),
        Duration::from_secs(5),
    );

    let first = app
        .clone()
        .oneshot(register_request(r#"{"userId": "u1"}"#))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(register_request(r#"{"userId": "u1"}"#))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let json = json_body(second).await;
    assert_eq!(json["message"], "User already registered");
    assert_eq!(json["sharingCode"], "C1");
}

#[tokio::test]
async fn test_missing_user_id() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(
        &mock_server,
        Arc::new(MemoryUserStore::new()),
        Duration::from_secs(5),
    );

    let response = app.oneshot(register_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "userId is required and must be a string");
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_non_string_user_id() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(
        &mock_server,
        Arc::new(MemoryUserStore::new()),
        Duration::from_secs(5),
    );

    let response = app
        .oneshot(register_request(r#"{"userId": 12345}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("userId"));
}

#[tokio::test]
async fn test_empty_and_invalid_bodies() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(
        &mock_server,
        Arc::new(MemoryUserStore::new()),
        Duration::from_secs(5),
    );

    let response = app
        .clone()
        .oneshot(register_request(Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Request body is required");

    let response = app.oneshot(register_request("not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Invalid JSON in request body"
    );
}

#[tokio::test]
async fn test_missing_sharing_code_returns_bad_gateway() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": { "safeWalkId": "S1" }
        })))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryUserStore::new());
    let app = create_test_app(&mock_server, store.clone(), Duration::from_secs(5));

    let response = app
        .oneshot(register_request(r#"{"userId": "u1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Invalid platform response");
    assert!(json["details"]
        .as_str()
        .unwrap()
        .contains("missing required fields"));

    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_platform_error_status_returns_bad_gateway() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryUserStore::new());
    let app = create_test_app(&mock_server, store.clone(), Duration::from_secs(5));

    let response = app
        .oneshot(register_request(r#"{"userId": "u1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Failed to register with platform");
    assert!(json["details"]
        .as_str()
        .unwrap()
        .contains("upstream exploded"));
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_platform_timeout_returns_bad_gateway() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(platform_success().set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryUserStore::new());
    let app = create_test_app(&mock_server, store.clone(), Duration::from_millis(200));

    let response = app
        .oneshot(register_request(r#"{"userId": "u1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = json_body(response).await;
    assert_eq!(json["code"], "UPSTREAM_TIMEOUT");
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_cors_preflight() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(
        &mock_server,
        Arc::new(MemoryUserStore::new()),
        Duration::from_secs(5),
    );

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/register/platform")
                .header(header::ORIGIN, "https://app.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
