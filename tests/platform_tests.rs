mod common;

use axum::http::{Method, StatusCode};
use career_map::{AppConfig, MockNewsService, bootstrap_super_admin, models::Role};
use common::TestApp;

// --- Health, docs and fallback ---

#[tokio::test]
async fn health_check_answers_ok() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn openapi_document_lists_the_api() {
    let app = TestApp::new();
    let (status, doc) = app
        .send(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/exams/submit"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn unknown_routes_get_a_json_404() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

// --- News proxy ---

#[tokio::test]
async fn news_returns_the_provider_document() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::GET, "/api/news?category=technology", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["articles"][0]["title"], "Top technology story");
}

#[tokio::test]
async fn news_rejects_unknown_categories() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::GET, "/api/news?category=gossip", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
}

#[tokio::test]
async fn news_provider_failure_is_a_bad_gateway() {
    let app = TestApp::with_news(MockNewsService::new_failing());
    let (status, body) = app
        .send(Method::GET, "/api/news?category=sports", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Bad Gateway");
}

// --- Bootstrap account ---

#[tokio::test]
async fn bootstrap_creates_the_super_admin_once() {
    let mut app = TestApp::new();
    app.state.config = AppConfig {
        super_admin_email: Some("root@example.com".to_string()),
        super_admin_password: Some("rootpass1".to_string()),
        ..AppConfig::default()
    };

    assert!(bootstrap_super_admin(&app.state).await.unwrap());
    assert!(!bootstrap_super_admin(&app.state).await.unwrap());

    let root = app
        .state
        .repo
        .find_user_by_email("root@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(root.role, Role::SuperAdmin);
}

#[tokio::test]
async fn bootstrap_is_skipped_without_credentials() {
    let app = TestApp::new();
    assert!(!bootstrap_super_admin(&app.state).await.unwrap());
    assert!(app.state.repo.list_users().await.unwrap().is_empty());
}
