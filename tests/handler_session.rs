mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{StaticOAuthProvider, TestApp, TestOptions, set_cookie};
use serde_json::{Value, json};

fn oauth_app() -> TestApp {
    TestApp::build(TestOptions {
        oauth: Some(Arc::new(StaticOAuthProvider::new("good-code", "oauth@example.com"))),
        ..TestOptions::default()
    })
}

/// Runs the login step and returns the state cookie value.
async fn begin(app: &TestApp) -> String {
    let response = app.server.get("/api/v1/session/oauth/login").await;
    assert_eq!(response.status_code(), 302);

    let location = response.header("location");
    let location = location.to_str().unwrap();
    assert!(location.starts_with("https://accounts.example.com/authorize"));

    let cookie = set_cookie(&response, "oauth_state").unwrap();
    let state = cookie.trim_start_matches("oauth_state=").to_string();
    assert!(location.ends_with(&format!("state={state}")));
    state
}

#[tokio::test]
async fn test_oauth_flow_creates_session() {
    let app = oauth_app();
    let state = begin(&app).await;

    let response = app
        .server
        .get("/api/v1/session/oauth/callback")
        .add_query_param("state", &state)
        .add_query_param("code", "good-code")
        .add_header("Cookie", format!("oauth_state={state}"))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["user"]["email"], "oauth@example.com");
    assert_eq!(set_cookie(&response, "oauth_state").unwrap(), "oauth_state=");

    let session = set_cookie(&response, "session_id").unwrap();
    assert_eq!(app.sessions.len(), 1);

    let response = app
        .server
        .get("/api/v1/session/profile")
        .add_header("Cookie", session)
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["name"], "OAuth User");
}

#[tokio::test]
async fn test_oauth_callback_rejects_state_mismatch() {
    let app = oauth_app();
    let state = begin(&app).await;
    let other = begin(&app).await;

    let response = app
        .server
        .get("/api/v1/session/oauth/callback")
        .add_query_param("state", &other)
        .add_query_param("code", "good-code")
        .add_header("Cookie", format!("oauth_state={state}"))
        .await;

    assert_eq!(response.status_code(), 401);
    assert!(app.sessions.is_empty());
}

#[tokio::test]
async fn test_oauth_callback_without_cookie() {
    let app = oauth_app();
    let state = begin(&app).await;

    let response = app
        .server
        .get("/api/v1/session/oauth/callback")
        .add_query_param("state", &state)
        .add_query_param("code", "good-code")
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_oauth_not_configured() {
    let app = TestApp::new();

    let response = app.server.get("/api/v1/session/oauth/login").await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_password_session_login_and_logout() {
    let app = TestApp::new();
    app.register("sess@example.com").await;

    let response = app
        .server
        .post("/api/v1/session/login")
        .json(&json!({ "email": "sess@example.com", "password": "correct-horse" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let session = set_cookie(&response, "session_id").unwrap();

    // A session also authenticates the URL API.
    let response = app
        .server
        .get("/api/v1/urls")
        .add_header("Cookie", session.clone())
        .await;
    assert_eq!(response.status_code(), 200);

    let response = app
        .server
        .post("/api/v1/session/logout")
        .add_header("Cookie", session.clone())
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(set_cookie(&response, "session_id").unwrap(), "session_id=");

    let response = app
        .server
        .get("/api/v1/session/profile")
        .add_header("Cookie", session)
        .await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "session_invalid_or_expired"
    );
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = TestApp::new();

    let response = app.server.post("/api/v1/session/logout").await;

    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_stale_session_cookie_on_protected_route() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/api/v1/urls")
        .add_header("Cookie", "session_id=doesnotexist")
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "session_invalid_or_expired"
    );
}

#[tokio::test(start_paused = true)]
async fn test_session_expires_after_ttl() {
    let app = TestApp::build(TestOptions {
        session_ttl: Duration::from_secs(60),
        ..TestOptions::default()
    });
    app.register("ttl@example.com").await;

    let response = app
        .server
        .post("/api/v1/session/login")
        .json(&json!({ "email": "ttl@example.com", "password": "correct-horse" }))
        .await;
    let session = set_cookie(&response, "session_id").unwrap();

    tokio::time::advance(Duration::from_secs(61)).await;

    let response = app
        .server
        .get("/api/v1/session/profile")
        .add_header("Cookie", session)
        .await;
    assert_eq!(response.status_code(), 401);
    assert!(app.sessions.is_empty());
}
