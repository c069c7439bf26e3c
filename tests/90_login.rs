mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn signup_never_echoes_secrets() {
    let app = TestApp::new();

    let (status, body) = app.signup("Al", "al@example.com").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["results"]["first_name"], "Al");
    assert!(body["results"].get("password").is_none());
    assert!(body["results"]["user_id"].is_string());

    let (status, body) = app.signup("Al", "al@example.com").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");

    let (status, body) = app.signup("", "second@example.com").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["first_name"].is_string());
}

#[tokio::test]
async fn one_letter_first_name_signs_up() {
    let app = TestApp::new();

    let payload = json!({ "first_name": "A", "email": "a@x.com", "address": "Y", "password": "secret12" });
    let (status, body) = app.send(Method::POST, "/signup", None, Some(payload)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["results"]["first_name"], "A");
    assert_eq!(body["results"]["email"], "a@x.com");
    assert!(body["results"].get("password").is_none());
    assert!(body["results"].get("address").is_none());

    let (status, _) = app.login("a@x.com", "secret12").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_failures() {
    let app = TestApp::new();
    app.signup("Alice", "alice@example.com").await;

    let (status, body) = app.login("alice@example.com", "wrong-password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid password");

    let (status, body) = app.login("nobody@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email not found, please check again!");
}

#[tokio::test]
async fn new_login_supersedes_old_tokens() {
    let app = TestApp::new();
    let (_, first) = app.authed_user("alice@example.com").await;

    let (status, _) = app.get("/user/me", &first).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.login("alice@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    let second = body["results"]["token"].as_str().expect("token").to_string();
    let refresh = body["results"]["refresh_token"].as_str().expect("refresh").to_string();
    assert_ne!(first, second);

    let (status, body) = app.get("/user/me", &first).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token or logged out");

    let (status, body) = app.get("/user/me", &second).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["email"], "alice@example.com");
    assert!(body["results"].get("token").is_none());

    // The stored refresh token is also an accepted session credential
    let (status, _) = app.get("/user/me", &refresh).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bearer_header_is_required() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized header request");

    let request = axum::http::Request::builder()
        .uri("/users")
        .header("authorization", "Token abc")
        .body(axum::body::Body::empty())
        .expect("request");
    let (status, body) = app.send_request(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized access token");

    let (status, body) = app.get("/users", "not.a.jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid access token");
}

#[tokio::test]
async fn users_cannot_delete_themselves() {
    let app = TestApp::new();
    let (me, token) = app.authed_user("alice@example.com").await;
    let (_, other) = app.signup("Bob", "bob@example.com").await;
    let other_id = other["results"]["user_id"].as_str().expect("user_id").to_string();

    let (status, body) = app.delete(&format!("/users/{}", me), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot delete your own account");

    let (status, body) = app.patch(&format!("/users/{}", other_id), &token, json!({ "last_name": "Builder" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["last_name"], "Builder");

    let (status, _) = app.delete(&format!("/users/{}", other_id), &token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/users/{}", other_id), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn liveness_endpoints_and_unknown_routes() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong");
    assert_eq!(body["status"], "OK");

    let (status, _) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::GET, "/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}
