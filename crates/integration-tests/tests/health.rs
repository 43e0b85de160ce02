//! Health endpoints, response headers and not-found handling.

use axum::http::StatusCode;
use stockbook_integration_tests::TestApp;

#[tokio::test]
async fn test_health_is_ok() {
    let mut app = TestApp::new();
    let resp = app.get("/health").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");
}

#[tokio::test]
async fn test_readiness_pings_store() {
    let mut app = TestApp::new();
    let resp = app.get("/health/ready").await;

    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_every_response_carries_request_id_and_security_headers() {
    let mut app = TestApp::new();
    let resp = app.get("/").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.header("x-request-id").is_some_and(|id| !id.is_empty()));
    assert_eq!(resp.header("x-frame-options"), Some("DENY"));
    assert_eq!(resp.header("x-content-type-options"), Some("nosniff"));
}

#[tokio::test]
async fn test_unknown_entities_are_not_found() {
    let mut app = TestApp::new();

    let resp = app.get("/products/view/PROD404").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.contains("PROD404"));

    let resp = app.get("/locations/edit/NOWHERE").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app.get("/movements/view/MOV404").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_shows_counts() {
    let (mut app, _) = TestApp::seeded().await;
    let resp = app.get("/").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.contains(r#"<span class="card-count">4</span>"#));
    assert!(resp.contains(r#"<span class="card-count">20</span>"#));
}
