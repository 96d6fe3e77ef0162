mod common;

use axum::http::{Method, StatusCode};
use common::{create_category, send, signed_in, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_category_crud() {
    let app = spawn_app().await;
    let token = signed_in(&app, "owner@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/categories",
        Some(&token),
        Some(json!({ "name": "  Rent  ", "kind": "expense", "icon": "house" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Rent");
    assert_eq!(body["data"]["color"], "#3B82F6");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/categories/{id}"),
        Some(&token),
        Some(json!({ "color": "#00FF00", "icon": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["color"], "#00FF00");
    assert!(body["data"]["icon"].is_null());
    assert_eq!(body["data"]["name"], "Rent");

    let (status, body) = send(&app, Method::GET, "/categories", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/categories/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/categories/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn test_duplicate_category_name_conflicts() {
    let app = spawn_app().await;
    let token = signed_in(&app, "dupcat@example.com").await;
    create_category(&app, &token, "Food").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/categories",
        Some(&token),
        Some(json!({ "name": "Food" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "conflict");

    // Names are only unique per user
    let other = signed_in(&app, "other-dupcat@example.com").await;
    create_category(&app, &other, "Food").await;
}

#[tokio::test]
async fn test_invalid_inputs_are_rejected() {
    let app = spawn_app().await;
    let token = signed_in(&app, "invalid@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/categories",
        Some(&token),
        Some(json!({ "name": "Bad", "color": "blue" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::GET, "/categories/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::GET, "/categories?limit=5000", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let category_id = create_category(&app, &token, "Misc").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&token),
        Some(json!({ "category_id": category_id, "amount": "0", "kind": "expense" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&token),
        Some(json!({ "category_id": category_id, "amount": "1.005", "kind": "expense" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_cannot_touch_other_users_records() {
    let app = spawn_app().await;
    let alice = signed_in(&app, "alice@example.com").await;
    let mallory = signed_in(&app, "mallory@example.com").await;

    let category_id = create_category(&app, &alice, "Travel").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&alice),
        Some(json!({
            "category_id": category_id,
            "amount": "-120.00",
            "kind": "expense",
            "occurred_at": "2026-03-10T09:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/budgets",
        Some(&alice),
        Some(json!({
            "category_id": category_id,
            "name": "Travel",
            "limit": "500",
            "period": "monthly",
            "start_date": "2026-03-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let budget_id = body["data"]["id"].as_str().unwrap().to_string();

    for uri in [
        format!("/categories/{category_id}"),
        format!("/transactions/{tx_id}"),
        format!("/budgets/{budget_id}"),
        format!("/budgets/{budget_id}/progress"),
    ] {
        let (status, _) = send(&app, Method::GET, &uri, Some(&mallory), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
    }

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/transactions/{tx_id}"),
        Some(&mallory),
        Some(json!({ "amount": "-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for uri in [
        format!("/transactions/{tx_id}"),
        format!("/budgets/{budget_id}"),
        format!("/categories/{category_id}"),
    ] {
        let (status, _) = send(&app, Method::DELETE, &uri, Some(&mallory), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
    }

    // Referencing another user's category is also not found
    let (status, body) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&mallory),
        Some(json!({ "category_id": category_id, "amount": "5", "kind": "expense" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Category not found");

    let (_, body) = send(&app, Method::GET, "/transactions", Some(&mallory), None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/transactions/{tx_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["amount"], "-120.00");
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let app = spawn_app().await;
    let token = signed_in(&app, "inuse@example.com").await;
    let category_id = create_category(&app, &token, "Utilities").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&token),
        Some(json!({ "category_id": category_id, "amount": -60, "kind": "expense" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/categories/{category_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "category_in_use");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/transactions/{tx_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/categories/{category_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_transaction_list_filters() {
    let app = spawn_app().await;
    let token = signed_in(&app, "filters@example.com").await;
    let food = create_category(&app, &token, "Food").await;
    let salary = create_category(&app, &token, "Salary").await;

    for (category, amount, kind, at) in [
        (&food, "-10.00", "expense", "2026-02-01T10:00:00Z"),
        (&food, "-20.00", "expense", "2026-02-15T10:00:00Z"),
        (&salary, "3000.00", "income", "2026-02-28T10:00:00Z"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/transactions",
            Some(&token),
            Some(json!({ "category_id": category, "amount": amount, "kind": kind, "occurred_at": at })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&app, Method::GET, "/transactions", Some(&token), None).await;
    let all = body["data"].as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["amount"], "3000.00");

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/transactions?category_id={food}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    let (_, body) = send(&app, Method::GET, "/transactions?kind=income", Some(&token), None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = send(
        &app,
        Method::GET,
        "/transactions?from=2026-02-10T00:00:00Z&to=2026-02-20T00:00:00Z",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (_, body) = send(&app, Method::GET, "/transactions?skip=1&limit=1", Some(&token), None).await;
    let page = body["data"].as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["amount"], "-20.00");
}

#[tokio::test]
async fn test_deleting_account_cascades() {
    let app = spawn_app().await;
    common::register(&app, "leaving@example.com").await;
    let pair = common::login(&app, "leaving@example.com").await;
    let token = pair["access_token"].as_str().unwrap().to_string();

    let category_id = create_category(&app, &token, "Books").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&token),
        Some(json!({ "category_id": category_id, "amount": "-15.99", "kind": "expense" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        Method::POST,
        "/budgets",
        Some(&token),
        Some(json!({
            "category_id": category_id,
            "name": "Books",
            "limit": "50",
            "start_date": "2026-01-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::DELETE, "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/categories", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": pair["refresh_token"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The email is free again and the new account starts empty
    let token = signed_in(&app, "leaving@example.com").await;
    for uri in ["/categories", "/transactions", "/budgets"] {
        let (status, body) = send(&app, Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(0), "{uri}");
    }
}

#[tokio::test]
async fn test_oversized_inputs_are_validation_errors() {
    let app = spawn_app().await;
    let token = signed_in(&app, "huge@example.com").await;
    let category_id = create_category(&app, &token, "Huge").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(&token),
        Some(json!({
            "category_id": category_id,
            "amount": "79228162514264337593543950335",
            "kind": "expense"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "validation_error");

    let (status, _) = send(
        &app,
        Method::POST,
        "/budgets",
        Some(&token),
        Some(json!({
            "category_id": category_id,
            "name": "Unbounded",
            "limit": "79228162514264337593543950335",
            "start_date": "2026-01-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    for uri in ["/categories", "/transactions", "/budgets"] {
        let (status, body) = send(
            &app,
            Method::GET,
            &format!("{uri}?skip=18446744073709551615"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(body["error"]["kind"], "validation_error");
    }
}
