//! Review moderation handlers and the public featured list.

use axum::Json;
use axum::extract::State;

use fleetdesk_core::types::PageResponse;
use fleetdesk_entity::review::{Review, ReviewResponseInput};

use crate::dto::request::{
    BulkIdsRequest, BulkReviewStatusRequest, ReviewQuery, ReviewStatusRequest,
};
use crate::dto::response::{ApiResponse, BulkResult, Deleted};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ReviewQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Review>>>> {
    let filter = query.into_filter()?;
    let page = state.services.reviews.list(&auth, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /reviews/{id}
pub async fn get_review(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Review>>> {
    let review = state.services.reviews.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// PUT /reviews/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<ReviewStatusRequest>,
) -> ApiResult<Json<ApiResponse<Review>>> {
    let review = state.services.reviews.set_status(&auth, id, req.status).await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// POST /reviews/bulk/status
pub async fn bulk_set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BulkReviewStatusRequest>,
) -> ApiResult<Json<ApiResponse<BulkResult>>> {
    let affected = state
        .services
        .reviews
        .bulk_set_status(&auth, &req.ids, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(BulkResult { affected })))
}

/// PUT /reviews/{id}/response
pub async fn respond(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<ReviewResponseInput>,
) -> ApiResult<Json<ApiResponse<Review>>> {
    let review = state.services.reviews.respond(&auth, id, input).await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// POST /reviews/{id}/toggle-featured
pub async fn toggle_featured(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Review>>> {
    let review = state.services.reviews.toggle_featured(&auth, id).await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// DELETE /reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Deleted>>> {
    state.services.reviews.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(Deleted { id, deleted: true })))
}

/// POST /reviews/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BulkIdsRequest>,
) -> ApiResult<Json<ApiResponse<BulkResult>>> {
    let affected = state.services.reviews.bulk_delete(&auth, &req.ids).await?;
    Ok(Json(ApiResponse::ok(BulkResult { affected })))
}

/// GET /api/public/reviews
pub async fn public_featured(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ReviewQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Review>>>> {
    let filter = query.into_filter()?;
    let page = state.services.reviews.public_featured(filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}
