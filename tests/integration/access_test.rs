//! Integration tests for the health check and the role guards.

mod helpers;

use http::StatusCode;

#[tokio::test]
async fn test_health_is_open() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "memory");
}

#[tokio::test]
async fn test_admin_requires_token() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/admin/bookings", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request("GET", "/api/admin/bookings", None, Some("not-a-jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_vendor_cannot_reach_admin() {
    let app = helpers::TestApp::new().await;
    let (_, token) = app.vendor_token("Island Transfers");

    let response = app
        .request("GET", "/api/admin/currencies", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_admin_cannot_reach_vendor() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let response = app
        .request("GET", "/api/vendor/vehicles", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_public_needs_no_token() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/public/currencies", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"].as_array().unwrap().is_empty());
}
