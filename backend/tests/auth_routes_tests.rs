//! HTTP-level tests for login, token refresh, health and the API document.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use common::fixtures::TestUser;
use common::{FailingStore, TestApp};

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new();
    let (admin, _) = app.admin().await;
    let creds = TestUser::admin();

    let login = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({"username": creds.username, "password": creds.password}),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let token = login.body["access_token"].as_str().unwrap().to_string();
    assert!(login.body["refresh_token"].is_string());
    assert_eq!(login.body["expires_in"], 30 * 60);

    let me = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["id"], admin.id);
    assert_eq!(me.body["username"], "admin");
    assert_eq!(me.body["roles"], json!(["ADMIN"]));
}

#[tokio::test]
async fn test_me_lists_customer_capabilities() {
    let app = TestApp::new();
    let (customer, token) = app.customer("carol").await;

    let me = app.get("/api/v1/auth/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["roles"], json!(["CUSTOMER"]));
    assert_eq!(
        me.body["permissions"],
        json!([
            format!("user:edit:{}", customer.id),
            format!("user:update:{}", customer.id)
        ])
    );
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = TestApp::new();
    app.admin().await;

    let resp = app
        .post(
            "/api/v1/auth/login",
            None,
            json!({"username": "admin", "password": "guess"}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new();

    let missing = app.get("/api/v1/auth/me", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app.get("/api/v1/auth/me", Some("not-a-jwt")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let app = TestApp::new();
    let (user, _) = app.customer("carol").await;
    let tokens = app.state.auth_service.generate_tokens(&user).unwrap();

    let resp = app
        .post(
            "/api/v1/auth/refresh",
            None,
            json!({"refresh_token": tokens.refresh_token}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let access = resp.body["access_token"].as_str().unwrap();

    let me = app.get("/api/v1/auth/me", Some(access)).await;
    assert_eq!(me.body["username"], "carol");

    // An access token is not accepted as a refresh token
    let wrong = app
        .post(
            "/api/v1/auth/refresh",
            None,
            json!({"refresh_token": tokens.access_token}),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_not_accepted_as_bearer() {
    let app = TestApp::new();
    let (user, _) = app.customer("carol").await;
    let tokens = app.state.auth_service.generate_tokens(&user).unwrap();

    let resp = app
        .get(
            &format!("/api/v1/user/edit/{}", user.id),
            Some(&tokens.refresh_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = TestApp::new();

    let health = app.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "healthy");

    let ready = app.get("/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.body["status"], "ready");
}

#[tokio::test]
async fn test_ready_reports_unavailable_store() {
    let app = TestApp::with_store(Arc::new(FailingStore));

    let ready = app.get("/ready", None).await;
    assert_eq!(ready.status, StatusCode::SERVICE_UNAVAILABLE);

    let health = app.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestApp::new();

    let resp = app.get("/api/v1/openapi.json", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["info"]["title"], "Account Keeper API");
    assert!(resp.body["paths"]["/api/v1/user/{id}/update"]["post"].is_object());
}
