mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{StalledClickRepository, TestApp, TestOptions};

#[tokio::test]
async fn test_redirect_success() {
    let app = TestApp::new();
    app.urls.seed("redir1", "https://example.com/target", None);

    let response = app.server.get("/redir1").await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = TestApp::new();

    let response = app.server.get("/missing").await;

    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_expired_link_is_gone() {
    let app = TestApp::new();
    app.urls.seed("old", "https://example.com/old", None);
    app.urls.expire("old");

    let response = app.server.get("/old").await;

    assert_eq!(response.status_code(), 410);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "expired");
}

#[tokio::test]
async fn test_redirect_records_click() {
    let app = TestApp::new();
    let record = app.urls.seed("clicky", "https://example.com/", None);

    let response = app
        .server
        .get("/clicky")
        .add_header("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0")
        .add_header("Referer", "https://news.example.com/")
        .add_header("X-Forwarded-For", "203.0.113.9")
        .await;
    assert_eq!(response.status_code(), 302);

    app.wait_for_clicks(1).await;

    let stats = app.state.analytics_service.stats(record.id).await.unwrap();
    assert_eq!(stats.total_clicks, 1);
    assert_eq!(stats.unique_clicks, 1);
}

#[tokio::test]
async fn test_redirect_not_delayed_by_stalled_click_store() {
    let app = TestApp::build(TestOptions {
        click_queue: 2,
        clicks: Some(Arc::new(StalledClickRepository)),
        ..TestOptions::default()
    });
    app.urls.seed("fast", "https://example.com/fast", None);

    // The worker never finishes a write, so the queue fills and later clicks
    // are dropped. Redirects must keep answering regardless.
    for _ in 0..10 {
        let response = tokio::time::timeout(Duration::from_secs(2), app.server.get("/fast"))
            .await
            .expect("redirect blocked on click recording");
        assert_eq!(response.status_code(), 302);
    }

    assert!(app.state.click_recorder.dropped() > 0);
}

#[tokio::test]
async fn test_deleted_link_stops_resolving() {
    let app = TestApp::new();
    let token = app.register("owner@example.com").await;
    let user = app.users.find("owner@example.com");
    let record = app.urls.seed("gone1", "https://example.com/", Some(user));

    let response = app
        .server
        .delete(&format!("/api/v1/urls/{}", record.id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), 204);

    let response = app.server.get("/gone1").await;
    assert_eq!(response.status_code(), 404);
}
