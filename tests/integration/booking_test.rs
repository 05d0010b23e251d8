//! Integration tests for booking listing, status updates, and export.

mod helpers;

use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_list_third_page() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();
    let seeded = app.seed_bookings(25, None);

    let response = app
        .request("GET", "/api/admin/bookings?limit=10&page=3", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["total"], 25);
    assert_eq!(data["page"], 3);
    assert_eq!(data["limit"], 10);
    assert_eq!(data["total_pages"], 3);

    // Newest first, so the last page holds the five oldest.
    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[4]["booking_number"], seeded[0].booking_number.as_str());
    assert_eq!(items[0]["customer_name"], "Ann Walker");
}

#[tokio::test]
async fn test_unknown_status_filter_rejected() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let response = app
        .request("GET", "/api/admin/bookings?status=shipped", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert!(response.body["details"]["status"].is_array());
}

#[tokio::test]
async fn test_vendor_sees_only_own_bookings() {
    let app = helpers::TestApp::new().await;
    let (business_id, token) = app.vendor_token("Island Transfers");
    app.seed_bookings(3, Some(business_id));
    let other = app.seed_bookings(2, None);

    let response = app
        .request("GET", "/api/vendor/bookings", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total"], 3);

    let path = format!("/api/vendor/bookings/{}", other[0].id);
    let response = app.request("GET", &path, None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            "PUT",
            &format!("{path}/status"),
            Some(json!({ "status": "confirmed" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_cancel_requires_reason() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();
    let booking = app.seed_bookings(1, None).remove(0);
    let path = format!("/api/admin/bookings/{}/status", booking.id);

    let response = app
        .request("PUT", &path, Some(json!({ "status": "cancelled" })), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .request(
            "PUT",
            &path,
            Some(json!({ "status": "cancelled", "cancellation_reason": "Flight moved" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["booking_status"], "cancelled");
    assert!(response.body["data"]["cancelled_at"].is_string());
}

#[tokio::test]
async fn test_bulk_status_rejects_empty_selection() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let response = app
        .request(
            "POST",
            "/api/admin/bookings/bulk/status",
            Some(json!({ "ids": [], "status": "confirmed" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_bulk_confirm() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();
    let seeded = app.seed_bookings(3, None);

    let response = app
        .request(
            "POST",
            "/api/admin/bookings/bulk/status",
            Some(json!({
                "ids": [seeded[0].id, seeded[1].id],
                "status": "confirmed",
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["affected"], 2);

    let response = app
        .request("GET", "/api/admin/bookings?status=confirmed", None, Some(&token))
        .await;
    assert_eq!(response.body["data"]["total"], 2);
}

#[tokio::test]
async fn test_export_csv() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();
    app.seed_bookings(4, None);

    let response = app
        .request("GET", "/api/admin/bookings/export", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers["content-type"].to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    assert!(
        response.headers["content-disposition"]
            .to_str()
            .unwrap()
            .contains("bookings.csv")
    );

    let lines: Vec<&str> = response.text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("booking_number,customer_name,"));
    assert!(lines[1].contains("Ann Walker"));
}
