//! Integration tests for the identity client using wiremock
//!
//! These tests mock the user service to verify login, registration and the
//! user-facing error messages derived from its responses.

use pulseboard_core::Credential;
use pulseboard_egress::identity::{
    AuthClient, IdentityConfig, LOGIN_FAILED_MESSAGE, REGISTRATION_FAILED_MESSAGE,
    RegisterRequest,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

fn client_for(server: &MockServer) -> AuthClient {
    AuthClient::new(IdentityConfig::new(server.uri())).unwrap()
}

fn register_request() -> RegisterRequest {
    RegisterRequest {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
        password: "hunter2".to_string(),
        full_name: Some("Ada Lovelace".to_string()),
    }
}

#[tokio::test]
async fn test_login_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"username": "ada", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc123",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let credential = client_for(&mock_server)
        .login("ada", "hunter2")
        .await
        .unwrap();
    assert_eq!(credential, Credential::new("abc123"));
}

#[tokio::test]
async fn test_login_rejected_surfaces_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect username or password"
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .login("ada", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.message, "Incorrect username or password");
    assert_eq!(err.status_code, Some(401));
}

#[tokio::test]
async fn test_login_server_error_without_detail_uses_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .login("ada", "hunter2")
        .await
        .unwrap_err();
    assert_eq!(err.message, LOGIN_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_login_missing_token_uses_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .login("ada", "hunter2")
        .await
        .unwrap_err();
    assert_eq!(err.message, LOGIN_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_login_unreachable_service_uses_fallback() {
    // Nothing listens on port 9 locally
    let client = AuthClient::new(IdentityConfig::new("http://127.0.0.1:9")).unwrap();
    let err = client.login("ada", "hunter2").await.unwrap_err();
    assert_eq!(err.message, LOGIN_FAILED_MESSAGE);
    assert_eq!(err.status_code, None);
}

#[tokio::test]
async fn test_register_then_auto_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/"))
        .and(body_json(json!({
            "username": "ada",
            "email": "ada@example.com",
            "password": "hunter2",
            "full_name": "Ada Lovelace"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "username": "ada",
            "email": "ada@example.com",
            "full_name": "Ada Lovelace",
            "is_active": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"username": "ada", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let credential = client_for(&mock_server)
        .register(&register_request())
        .await
        .unwrap();
    assert_eq!(credential.expose(), "fresh");
}

#[tokio::test]
async fn test_register_duplicate_user_skips_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Email or username already registered"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "nope"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .register(&register_request())
        .await
        .unwrap_err();
    assert_eq!(err.message, "Email or username already registered");
}

#[tokio::test]
async fn test_register_auto_login_failure_surfaces_login_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "invalid credentials"})),
        )
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .register(&register_request())
        .await
        .unwrap_err();
    assert_eq!(err.message, "invalid credentials");
}

#[tokio::test]
async fn test_register_validation_error_uses_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "email"], "msg": "value is not a valid email address"}]
        })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .register(&register_request())
        .await
        .unwrap_err();
    assert_eq!(err.message, REGISTRATION_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_current_user_sends_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "username": "ada",
            "email": "ada@example.com",
            "full_name": null,
            "is_active": true,
            "created_at": "2024-01-01T10:00:00"
        })))
        .mount(&mock_server)
        .await;

    let user = client_for(&mock_server)
        .current_user(&Credential::new("abc123"))
        .await
        .unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.username, "ada");
    assert!(user.full_name.is_none());
}
