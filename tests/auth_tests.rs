mod common;

use axum::http::{Method, StatusCode};
use common::{PASSWORD, login, register, send, signed_in, spawn_app, spawn_app_with, test_config};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_user_without_password() {
    let app = spawn_app().await;

    let user = register(&app, "Alice@Example.com").await;

    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["full_name"], "Test User");
    assert_eq!(user["is_active"], true);
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = spawn_app().await;
    register(&app, "dup@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "DUP@example.com", "password": PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "duplicate_email");
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "weak@example.com", "password": "alllowercase1" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "validation_error");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = spawn_app().await;

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = spawn_app().await;
    register(&app, "bob@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "bob@example.com", "password": "Wr0ngPassword" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "invalid_credentials");

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "invalid_credentials");
}

#[tokio::test]
async fn test_login_returns_token_pair() {
    let app = spawn_app().await;
    register(&app, "carol@example.com").await;

    let pair = login(&app, "carol@example.com").await;

    assert_eq!(pair["token_type"], "bearer");
    assert_eq!(pair["expires_in"], 30 * 60);
    assert!(pair["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(pair["refresh_token"].as_str().map(str::len), Some(64));
}

#[tokio::test]
async fn test_refresh_token_is_single_use() {
    let app = spawn_app().await;
    register(&app, "dave@example.com").await;
    let pair = login(&app, "dave@example.com").await;
    let original = pair["refresh_token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": original })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = body["data"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(rotated, original);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": original })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "token_invalid");

    // The replacement is still good
    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": rotated })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_with_unknown_token() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": "deadbeef" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "token_invalid");
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = spawn_app().await;
    register(&app, "erin@example.com").await;
    let pair = login(&app, "erin@example.com").await;
    let access = pair["access_token"].as_str().unwrap();
    let refresh = pair["refresh_token"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/logout",
        Some(access),
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Idempotent
    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/logout",
        Some(access),
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let app = spawn_app().await;
    register(&app, "frank@example.com").await;
    let first = login(&app, "frank@example.com").await;
    let second = login(&app, "frank@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/logout-all",
        Some(first["access_token"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Revoked 2 session(s)");

    for pair in [&first, &second] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refresh_token": pair["refresh_token"] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = spawn_app().await;

    let (status, body) = send(&app, Method::GET, "/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "unauthorized");

    let (status, body) = send(&app, Method::GET, "/users/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "token_invalid");
}

#[tokio::test]
async fn test_deactivated_account_cannot_log_in() {
    let app = spawn_app().await;
    let token = signed_in(&app, "gina@example.com").await;

    let (status, _) = send(&app, Method::POST, "/users/me/deactivate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "gina@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "invalid_credentials");

    // The still-unexpired access token is refused too
    let (status, _) = send(&app, Method::GET, "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_change_revokes_sessions() {
    let app = spawn_app().await;
    register(&app, "hank@example.com").await;
    let pair = login(&app, "hank@example.com").await;
    let access = pair["access_token"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::PUT,
        "/users/me",
        Some(access),
        Some(json!({ "password": "N3wPassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": pair["refresh_token"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "hank@example.com", "password": "N3wPassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_refresh_token_is_rejected() {
    let mut config = test_config();
    config.auth.refresh_token_ttl_days = -1;
    let app = spawn_app_with(config).await;
    register(&app, "stale@example.com").await;
    let pair = login(&app, "stale@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": pair["refresh_token"] })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "token_invalid");
}

#[tokio::test]
async fn test_refresh_fails_after_deactivation() {
    let app = spawn_app().await;
    register(&app, "paused@example.com").await;
    let pair = login(&app, "paused@example.com").await;
    let access = pair["access_token"].as_str().unwrap();

    let (status, _) = send(&app, Method::POST, "/users/me/deactivate", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": pair["refresh_token"] })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "token_invalid");
}
