//! Zone pricing, quotes and form reference data.

use axum::Json;
use axum::extract::State;

use fleetdesk_core::types::PageResponse;
use fleetdesk_entity::reference::{Location, Quote, QuoteRequest, ZonePrice, ZonePriceInput};
use fleetdesk_service::FormOptions;

use crate::dto::request::ZonePriceQuery;
use crate::dto::response::{ApiResponse, Deleted};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /pricing/zones
pub async fn list_zone_prices(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ZonePriceQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<ZonePrice>>>> {
    let filter = query.into_filter()?;
    let page = state.services.pricing.list_zone_prices(&auth, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// PUT /pricing/zones
///
/// Creates or replaces the price of a zone pair.
pub async fn upsert_zone_price(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<ZonePriceInput>,
) -> ApiResult<Json<ApiResponse<ZonePrice>>> {
    let price = state.services.pricing.upsert_zone_price(&auth, input).await?;
    Ok(Json(ApiResponse::ok(price)))
}

/// DELETE /pricing/zones/{id}
pub async fn delete_zone_price(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Deleted>>> {
    state.services.pricing.delete_zone_price(&auth, id).await?;
    Ok(Json(ApiResponse::ok(Deleted { id, deleted: true })))
}

/// GET /form-options
///
/// Select options for the vehicle, route and pricing forms.
pub async fn form_options(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<FormOptions>>> {
    let options = state.services.pricing.form_options(&auth).await?;
    Ok(Json(ApiResponse::ok(options)))
}

/// POST /api/public/quote
pub async fn quote(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<QuoteRequest>,
) -> ApiResult<Json<ApiResponse<Quote>>> {
    let quote = state.services.pricing.quote(&request).await?;
    Ok(Json(ApiResponse::ok(quote)))
}

/// GET /api/public/locations
pub async fn public_locations(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Location>>>> {
    let locations = state.services.pricing.public_locations().await?;
    Ok(Json(ApiResponse::ok(locations)))
}
