mod common;

use axum::http::StatusCode;
use common::{parse_body, token_for, TestApp, WEBHOOK_SECRET};
use serde_json::json;
use sports_booking_backend::domain::models::ledger::SkillLevel;

fn webhook_payload(event_id: &str, email: &str, receipt_id: &str) -> serde_json::Value {
    json!({
        "event_id": event_id,
        "user_email": email,
        "user_name": "Alice Paid",
        "amount": 120,
        "receipt_id": receipt_id
    })
}

#[tokio::test]
async fn test_webhook_requires_shared_secret() {
    let app = TestApp::new().await;
    app.seed_member("Alice", SkillLevel::Basic).await;
    let key = app.seed_event(4, 10, 120, SkillLevel::Basic).await;

    let response = app.request("POST", "/api/v1/payments/webhook", None, Some(webhook_payload(&key, "alice@example.com", "r1"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.request("POST", "/api/v1/payments/webhook", Some("wrong"), Some(webhook_payload(&key, "alice@example.com", "r1"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A member token is not the webhook secret either.
    let member = token_for("alice@example.com", "Alice");
    let response = app.request("POST", "/api/v1/payments/webhook", Some(&member), Some(webhook_payload(&key, "alice@example.com", "r1"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_registers_payer() {
    let app = TestApp::new().await;
    app.seed_member("Alice", SkillLevel::Basic).await;
    let key = app.seed_event(4, 10, 120, SkillLevel::Basic).await;

    let response = app.request("POST", "/api/v1/payments/webhook", Some(WEBHOOK_SECRET), Some(webhook_payload(&key, "Alice@Example.com", "r1"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["attendees"].as_array().unwrap().len(), 1);
    assert_eq!(body["attendees"][0]["name"], "Alice Paid");
    assert_eq!(body["attendees"][0]["email"], "alice@example.com");

    let text = app.raw_description(&key).await;
    assert!(text.contains("receipt_id = \"r1\""));
}

#[tokio::test]
async fn test_webhook_replay_is_noop() {
    let app = TestApp::new().await;
    app.seed_member("Alice", SkillLevel::Basic).await;
    let key = app.seed_event(4, 10, 120, SkillLevel::Basic).await;

    app.request("POST", "/api/v1/payments/webhook", Some(WEBHOOK_SECRET), Some(webhook_payload(&key, "alice@example.com", "r1"))).await;
    let after_first = app.raw_description(&key).await;

    let response = app.request("POST", "/api/v1/payments/webhook", Some(WEBHOOK_SECRET), Some(webhook_payload(&key, "alice@example.com", "r1"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.raw_description(&key).await, after_first);
    assert_eq!(after_first.matches("[[payments]]").count(), 1);
}

#[tokio::test]
async fn test_webhook_for_unknown_member() {
    let app = TestApp::new().await;
    let key = app.seed_event(4, 10, 120, SkillLevel::Basic).await;

    let response = app.request("POST", "/api/v1/payments/webhook", Some(WEBHOOK_SECRET), Some(webhook_payload(&key, "nobody@example.com", "r1"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!app.raw_description(&key).await.contains("nobody@example.com"));
}

#[tokio::test]
async fn test_paid_member_can_rejoin_after_leaving() {
    let app = TestApp::new().await;
    app.seed_member("Alice", SkillLevel::Basic).await;
    let key = app.seed_event(4, 10, 120, SkillLevel::Basic).await;
    let token = token_for("alice@example.com", "Alice");
    let uri = format!("/api/v1/events/{}/attendance", key);

    let response = app.request("POST", &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    app.request("POST", "/api/v1/payments/webhook", Some(WEBHOOK_SECRET), Some(webhook_payload(&key, "alice@example.com", "r1"))).await;

    let response = app.request("DELETE", &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app.request("POST", &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(parse_body(response).await["attendees"][0]["name"], "Alice");
}

#[tokio::test]
async fn test_payment_for_full_event_is_kept() {
    let app = TestApp::new().await;
    app.seed_member("Alice", SkillLevel::Basic).await;
    app.seed_member("Bob", SkillLevel::Basic).await;
    let key = app.seed_event(4, 1, 120, SkillLevel::Basic).await;

    app.request("POST", "/api/v1/payments/webhook", Some(WEBHOOK_SECRET), Some(webhook_payload(&key, "bob@example.com", "rb"))).await;

    let response = app.request("POST", "/api/v1/payments/webhook", Some(WEBHOOK_SECRET), Some(webhook_payload(&key, "alice@example.com", "ra"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["attendees"].as_array().unwrap().len(), 1);
    assert_eq!(body["attendees"][0]["email"], "bob@example.com");

    let text = app.raw_description(&key).await;
    assert!(text.contains("receipt_id = \"ra\""));
}

#[tokio::test]
async fn test_webhook_without_receipt_is_rejected() {
    let app = TestApp::new().await;
    app.seed_member("Alice", SkillLevel::Basic).await;
    let key = app.seed_event(4, 10, 120, SkillLevel::Basic).await;
    let before = app.raw_description(&key).await;

    for receipt in ["", "  "] {
        let response = app.request("POST", "/api/v1/payments/webhook", Some(WEBHOOK_SECRET), Some(webhook_payload(&key, "alice@example.com", receipt))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(app.raw_description(&key).await, before);
}

#[tokio::test]
async fn test_webhook_secret_prefix_is_not_enough() {
    let app = TestApp::new().await;
    app.seed_member("Alice", SkillLevel::Basic).await;
    let key = app.seed_event(4, 10, 120, SkillLevel::Basic).await;
    let prefix = &WEBHOOK_SECRET[..WEBHOOK_SECRET.len() - 1];
    let longer = format!("{}x", WEBHOOK_SECRET);

    for secret in [prefix, longer.as_str()] {
        let response = app.request("POST", "/api/v1/payments/webhook", Some(secret), Some(webhook_payload(&key, "alice@example.com", "r1"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
