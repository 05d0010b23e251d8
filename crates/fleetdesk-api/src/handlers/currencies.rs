//! Currency handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use fleetdesk_core::types::PageResponse;
use fleetdesk_entity::currency::{Currency, CurrencyInput};

use crate::dto::request::CurrencyQuery;
use crate::dto::response::{ApiResponse, Deleted};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /currencies
pub async fn list_currencies(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<CurrencyQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Currency>>>> {
    let filter = query.into_filter()?;
    let page = state.services.currencies.list(&auth, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /currencies/{id}
pub async fn get_currency(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Currency>>> {
    let currency = state.services.currencies.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(currency)))
}

/// POST /currencies
pub async fn create_currency(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CurrencyInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Currency>>)> {
    let currency = state.services.currencies.create(&auth, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(currency))))
}

/// PUT /currencies/{id}
pub async fn update_currency(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<CurrencyInput>,
) -> ApiResult<Json<ApiResponse<Currency>>> {
    let currency = state.services.currencies.update(&auth, id, input).await?;
    Ok(Json(ApiResponse::ok(currency)))
}

/// POST /currencies/{id}/toggle-active
pub async fn toggle_active(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Currency>>> {
    let currency = state.services.currencies.toggle_active(&auth, id).await?;
    Ok(Json(ApiResponse::ok(currency)))
}

/// POST /currencies/{id}/default
pub async fn set_default(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Currency>>> {
    let currency = state.services.currencies.set_default(&auth, id).await?;
    Ok(Json(ApiResponse::ok(currency)))
}

/// DELETE /currencies/{id}
pub async fn delete_currency(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Deleted>>> {
    state.services.currencies.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(Deleted { id, deleted: true })))
}

/// GET /api/public/currencies
pub async fn public_currencies(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Currency>>>> {
    let currencies = state.services.currencies.public_list().await?;
    Ok(Json(ApiResponse::ok(currencies)))
}
