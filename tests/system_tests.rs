mod common;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode};
use common::{send, signed_in, spawn_app, spawn_app_with, test_config};
use std::net::SocketAddr;
use tower::ServiceExt;

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"], "connected");
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["referrer-policy"], "no-referrer");
    assert_eq!(headers["cache-control"], "no-store");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let mut config = test_config();
    config.rate_limit.requests = 3;
    config.rate_limit.window_seconds = 3600;
    let app = spawn_app_with(config).await;

    for _ in 0..3 {
        let (status, _) = send(&app, Method::GET, "/categories", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/categories")
                .extension(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));

    // Health is exempt
    let (status, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    // Another client has its own bucket
    let response = app
        .oneshot(
            Request::builder()
                .uri("/categories")
                .extension(ConnectInfo(SocketAddr::from(([10, 0, 0, 7], 5555))))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_metrics_requires_auth() {
    let app = spawn_app().await;

    let (status, _) = send(&app, Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = signed_in(&app, "ops@example.com").await;
    let (status, _) = send(&app, Method::GET, "/metrics", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_profile_roundtrip() {
    let app = spawn_app().await;
    let token = signed_in(&app, "profile@example.com").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/users/me",
        Some(&token),
        Some(serde_json::json!({ "email": "Renamed@Example.com", "full_name": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "renamed@example.com");
    assert!(body["data"]["full_name"].is_null());

    let (status, body) = send(&app, Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "renamed@example.com");

    signed_in(&app, "taken@example.com").await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/users/me",
        Some(&token),
        Some(serde_json::json!({ "email": "taken@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "duplicate_email");
}
