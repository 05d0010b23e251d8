//! Route handlers. Admin and vendor share the management handlers; the
//! public listing only shows active routes.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use fleetdesk_core::types::PageResponse;
use fleetdesk_entity::route::{Route, RouteInput};

use crate::dto::request::RouteQuery;
use crate::dto::response::{ApiResponse, Deleted};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /routes
pub async fn list_routes(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<RouteQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Route>>>> {
    let filter = query.into_filter()?;
    let page = state.services.routes.list(&auth, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /routes/{id}
pub async fn get_route(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Route>>> {
    let route = state.services.routes.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(route)))
}

/// POST /routes
pub async fn create_route(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<RouteInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Route>>)> {
    let route = state.services.routes.create(&auth, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(route))))
}

/// PUT /routes/{id}
pub async fn update_route(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<RouteInput>,
) -> ApiResult<Json<ApiResponse<Route>>> {
    let route = state.services.routes.update(&auth, id, input).await?;
    Ok(Json(ApiResponse::ok(route)))
}

/// DELETE /routes/{id}
pub async fn delete_route(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Deleted>>> {
    state.services.routes.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(Deleted { id, deleted: true })))
}

/// POST /routes/{id}/toggle-active
pub async fn toggle_active(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Route>>> {
    let route = state.services.routes.toggle_active(&auth, id).await?;
    Ok(Json(ApiResponse::ok(route)))
}

/// POST /routes/{id}/toggle-popular (admin only)
pub async fn toggle_popular(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Route>>> {
    let route = state.services.routes.toggle_popular(&auth, id).await?;
    Ok(Json(ApiResponse::ok(route)))
}

/// GET /api/public/routes
pub async fn public_routes(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<RouteQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Route>>>> {
    let filter = query.into_filter()?;
    let page = state.services.routes.public_list(filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}
