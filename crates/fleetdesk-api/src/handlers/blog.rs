//! Blog handlers: admin management of posts, categories and tags, plus the
//! public read endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use fleetdesk_core::types::PageResponse;
use fleetdesk_entity::blog::{
    BlogCategory, BlogCategoryInput, BlogPost, BlogPostInput, BlogTag, BlogTagInput,
};

use crate::dto::request::{
    BlogCategoryQuery, BlogPostQuery, BlogTagQuery, BulkIdsRequest, BulkPostStatusRequest,
};
use crate::dto::response::{ApiResponse, BulkResult, Deleted};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedJson};
use crate::state::AppState;

// ── Posts ────────────────────────────────────────────────────────

/// GET /blog/posts
pub async fn list_posts(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<BlogPostQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<BlogPost>>>> {
    let filter = query.into_filter()?;
    let page = state.services.blog_posts.list(&auth, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /blog/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<BlogPost>>> {
    let post = state.services.blog_posts.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(post)))
}

/// POST /blog/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<BlogPostInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<BlogPost>>)> {
    let post = state.services.blog_posts.create(&auth, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(post))))
}

/// PUT /blog/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<BlogPostInput>,
) -> ApiResult<Json<ApiResponse<BlogPost>>> {
    let post = state.services.blog_posts.update(&auth, id, input).await?;
    Ok(Json(ApiResponse::ok(post)))
}

/// DELETE /blog/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Deleted>>> {
    state.services.blog_posts.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(Deleted { id, deleted: true })))
}

/// POST /blog/posts/{id}/toggle-featured
pub async fn toggle_post_featured(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<BlogPost>>> {
    let post = state.services.blog_posts.toggle_featured(&auth, id).await?;
    Ok(Json(ApiResponse::ok(post)))
}

/// POST /blog/posts/bulk/status
pub async fn bulk_post_status(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BulkPostStatusRequest>,
) -> ApiResult<Json<ApiResponse<BulkResult>>> {
    let affected = state
        .services
        .blog_posts
        .bulk_update_status(&auth, &req.ids, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(BulkResult { affected })))
}

/// POST /blog/posts/bulk/delete
pub async fn bulk_delete_posts(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BulkIdsRequest>,
) -> ApiResult<Json<ApiResponse<BulkResult>>> {
    let affected = state.services.blog_posts.bulk_delete(&auth, &req.ids).await?;
    Ok(Json(ApiResponse::ok(BulkResult { affected })))
}

// ── Categories ───────────────────────────────────────────────────

/// GET /blog/categories
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<BlogCategoryQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<BlogCategory>>>> {
    let filter = query.into_filter()?;
    let page = state.services.blog_categories.list(&auth, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /blog/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<BlogCategory>>> {
    let category = state.services.blog_categories.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(category)))
}

/// POST /blog/categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<BlogCategoryInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<BlogCategory>>)> {
    let category = state.services.blog_categories.create(&auth, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(category))))
}

/// PUT /blog/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<BlogCategoryInput>,
) -> ApiResult<Json<ApiResponse<BlogCategory>>> {
    let category = state.services.blog_categories.update(&auth, id, input).await?;
    Ok(Json(ApiResponse::ok(category)))
}

/// POST /blog/categories/{id}/toggle-active
pub async fn toggle_category_active(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<BlogCategory>>> {
    let category = state.services.blog_categories.toggle_active(&auth, id).await?;
    Ok(Json(ApiResponse::ok(category)))
}

/// DELETE /blog/categories/{id}
///
/// 409 while any post still uses the category.
pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Deleted>>> {
    state.services.blog_categories.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(Deleted { id, deleted: true })))
}

// ── Tags ─────────────────────────────────────────────────────────

/// GET /blog/tags
pub async fn list_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<BlogTagQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<BlogTag>>>> {
    let filter = query.into_filter()?;
    let page = state.services.blog_tags.list(&auth, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /blog/tags/{id}
pub async fn get_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<BlogTag>>> {
    let tag = state.services.blog_tags.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(tag)))
}

/// POST /blog/tags
pub async fn create_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<BlogTagInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<BlogTag>>)> {
    let tag = state.services.blog_tags.create(&auth, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(tag))))
}

/// PUT /blog/tags/{id}
pub async fn update_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<BlogTagInput>,
) -> ApiResult<Json<ApiResponse<BlogTag>>> {
    let tag = state.services.blog_tags.update(&auth, id, input).await?;
    Ok(Json(ApiResponse::ok(tag)))
}

/// DELETE /blog/tags/{id}
pub async fn delete_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Deleted>>> {
    state.services.blog_tags.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(Deleted { id, deleted: true })))
}

// ── Public ───────────────────────────────────────────────────────

/// GET /api/public/blog
pub async fn public_posts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<BlogPostQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<BlogPost>>>> {
    let filter = query.into_filter()?;
    let page = state.services.blog_posts.public_list(filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/public/blog/{slug}
pub async fn public_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ApiResponse<BlogPost>>> {
    let post = state.services.blog_posts.public_get(&slug).await?;
    Ok(Json(ApiResponse::ok(post)))
}
