// End-to-end identity tests driven through the router, no live server.
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use pawhaven::auth::TokenSigner;
use pawhaven::config::Config;
use pawhaven::notify::LogNotifier;
use pawhaven::state::AppState;
use pawhaven::{build_app, db};

fn test_app() -> (Router, AppState, TempDir) {
    let tmp = TempDir::new().unwrap();
    let pool = db::create_pool(&tmp.path().join("test.db")).unwrap();
    db::run_migrations(&pool).unwrap();

    let state = AppState {
        db: pool,
        config: Config::default(),
        tokens: Arc::new(TokenSigner::new(b"integration-test-secret", 24)),
        notifier: Arc::new(LogNotifier),
    };
    (build_app(state.clone()), state, tmp)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, name: &str, email: &str, password: &str, role: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": password,
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body
}

#[tokio::test]
async fn register_login_and_profile_round_trip() {
    let (app, _state, _tmp) = test_app();

    let registered = register(&app, "Alice", "alice@example.com", "secret123", "Adopter").await;
    let token = registered["token"].as_str().unwrap().to_string();
    assert_eq!(registered["user"]["email"], "alice@example.com");
    assert_eq!(registered["user"]["role"], "Adopter");
    // No secret material in the response
    assert!(registered["user"].get("passwordHash").is_none());
    assert!(registered["user"].get("resetToken").is_none());

    let (status, profile) = send(&app, Method::GET, "/api/users/me", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "Alice");

    let (status, login) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(login["token"].as_str().is_some());
}

#[tokio::test]
async fn login_does_not_reveal_which_accounts_exist() {
    let (app, _state, _tmp) = test_app();
    register(&app, "Alice", "alice@example.com", "secret123", "Adopter").await;

    let (wrong_pw_status, wrong_pw) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "nope" })),
    )
    .await;
    let (unknown_status, unknown) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ghost@example.com", "password": "nope" })),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw["message"], unknown["message"]);
}

#[tokio::test]
async fn registration_rejects_bad_input() {
    let (app, _state, _tmp) = test_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "", "email": "a@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "A", "email": "a@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "A", "email": "a@example.com",
            "password": "secret123", "role": "Admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "A", "email": "a@example.com",
            "password": "secret123", "role": "SuperUser",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_registration_is_conflict() {
    let (app, _state, _tmp) = test_app();
    register(&app, "Alice", "alice@example.com", "secret123", "Adopter").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Impostor", "email": "alice@example.com",
            "password": "secret123", "role": "Shelter",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already in use.");
}

#[tokio::test]
async fn protected_endpoints_require_a_valid_token() {
    let (app, _state, _tmp) = test_app();

    let (status, _) = send(&app, Method::GET, "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_keeps_name_when_blank() {
    let (app, _state, _tmp) = test_app();
    let registered = register(&app, "Alice", "alice@example.com", "secret123", "Adopter").await;
    let token = registered["token"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/api/users/me",
        Some(token.as_str()),
        Some(json!({ "name": "  ", "phoneNumber": "555-0100", "address": "1 Main St" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Alice");
    assert_eq!(updated["phoneNumber"], "555-0100");
    assert_eq!(updated["address"], "1 Main St");
}

#[tokio::test]
async fn password_reset_flow_works_once() {
    let (app, state, _tmp) = test_app();
    register(&app, "Alice", "alice@example.com", "secret123", "Adopter").await;

    // Unknown address gets the same acknowledgment as a real one
    let (status, ack) = send(
        &app,
        Method::POST,
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": "ghost@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, real_ack) = send(
        &app,
        Method::POST,
        "/api/auth/forgot-password",
        None,
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["message"], real_ack["message"]);

    // The token only lives in the database and the email
    let reset_token: String = state
        .db
        .get()
        .unwrap()
        .query_row(
            "SELECT reset_token FROM accounts WHERE email = 'alice@example.com'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(reset_token.len(), 64);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/auth/reset-password/{}", reset_token),
        None,
        Some(json!({ "password": "newsecret456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password is dead, new one works
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "newsecret456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A used token never works twice
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/auth/reset-password/{}", reset_token),
        None,
        Some(json!({ "password": "thirdsecret789" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Password reset token is invalid or has expired."
    );
}
