//! Vehicle handlers, mounted under both `/api/admin` and `/api/vendor`.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use fleetdesk_core::types::PageResponse;
use fleetdesk_entity::vehicle::{Vehicle, VehicleInput};

use crate::dto::request::{BulkAvailabilityRequest, BulkIdsRequest, VehicleQuery};
use crate::dto::response::{ApiResponse, BulkResult, Deleted};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<VehicleQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Vehicle>>>> {
    let filter = query.into_filter()?;
    let page = state.services.vehicles.list(&auth, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /vehicles/{id}
pub async fn get_vehicle(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Vehicle>>> {
    let vehicle = state.services.vehicles.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(vehicle)))
}

/// POST /vehicles
pub async fn create_vehicle(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<VehicleInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vehicle>>)> {
    let vehicle = state.services.vehicles.create(&auth, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(vehicle))))
}

/// PUT /vehicles/{id}
pub async fn update_vehicle(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<VehicleInput>,
) -> ApiResult<Json<ApiResponse<Vehicle>>> {
    let vehicle = state.services.vehicles.update(&auth, id, input).await?;
    Ok(Json(ApiResponse::ok(vehicle)))
}

/// DELETE /vehicles/{id}
pub async fn delete_vehicle(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Deleted>>> {
    state.services.vehicles.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(Deleted { id, deleted: true })))
}

/// POST /vehicles/{id}/toggle-availability
pub async fn toggle_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Vehicle>>> {
    let vehicle = state.services.vehicles.toggle_availability(&auth, id).await?;
    Ok(Json(ApiResponse::ok(vehicle)))
}

/// POST /vehicles/bulk/availability
pub async fn bulk_set_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BulkAvailabilityRequest>,
) -> ApiResult<Json<ApiResponse<BulkResult>>> {
    let affected = state
        .services
        .vehicles
        .bulk_set_availability(&auth, &req.ids, req.is_available)
        .await?;
    Ok(Json(ApiResponse::ok(BulkResult { affected })))
}

/// POST /vehicles/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BulkIdsRequest>,
) -> ApiResult<Json<ApiResponse<BulkResult>>> {
    let affected = state.services.vehicles.bulk_delete(&auth, &req.ids).await?;
    Ok(Json(ApiResponse::ok(BulkResult { affected })))
}
