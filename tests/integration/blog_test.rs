//! Integration tests for blog categories, tags, and posts.

mod helpers;

use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_category_slug_derived_from_name() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let response = app
        .request(
            "POST",
            "/api/admin/blog/categories",
            Some(json!({ "name": "Travel Tips" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["slug"], "travel-tips");
    assert_eq!(response.body["data"]["is_active"], true);
}

#[tokio::test]
async fn test_duplicate_category_slug_conflicts() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();
    let body = json!({ "name": "Travel Tips" });

    let first = app
        .request("POST", "/api/admin/blog/categories", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .request("POST", "/api/admin/blog/categories", Some(body), Some(&token))
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let category = app
        .request(
            "POST",
            "/api/admin/blog/categories",
            Some(json!({ "name": "Island Guides" })),
            Some(&token),
        )
        .await;
    let category_id = category.body["data"]["id"].as_str().unwrap().to_string();

    let post = app
        .request(
            "POST",
            "/api/admin/blog/posts",
            Some(json!({
                "title": "Getting from the airport to Ubud",
                "content": "Take the coast road and leave early.",
                "category_id": category_id,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(post.status, StatusCode::CREATED);

    let path = format!("/api/admin/blog/categories/{category_id}");
    let response = app.request("DELETE", &path, None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "INTEGRITY_ERROR");
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .contains("1 blog posts use this category")
    );
}

#[tokio::test]
async fn test_only_published_posts_are_public() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let draft = app
        .request(
            "POST",
            "/api/admin/blog/posts",
            Some(json!({ "title": "Draft notes", "content": "Not yet." })),
            Some(&token),
        )
        .await;
    assert_eq!(draft.status, StatusCode::CREATED);
    assert_eq!(draft.body["data"]["reading_time"], 1);

    let published = app
        .request(
            "POST",
            "/api/admin/blog/posts",
            Some(json!({
                "title": "Best beaches in Bali",
                "content": "Sand and surf.",
                "status": "published",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(published.status, StatusCode::CREATED);
    assert!(published.body["data"]["published_at"].is_string());

    let listing = app.request("GET", "/api/public/blog", None, None).await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.body["data"]["total"], 1);
    assert_eq!(listing.body["data"]["items"][0]["slug"], "best-beaches-in-bali");

    let detail = app
        .request("GET", "/api/public/blog/draft-notes", None, None)
        .await;
    assert_eq!(detail.status, StatusCode::NOT_FOUND);
}
