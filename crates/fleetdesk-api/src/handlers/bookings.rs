//! Booking handlers, mounted under both `/api/admin` and `/api/vendor`.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::Response;

use fleetdesk_core::error::AppError;
use fleetdesk_core::types::PageResponse;
use fleetdesk_entity::booking::Booking;

use crate::dto::request::{
    BookingQuery, BookingStatusRequest, BulkBookingStatusRequest, PaymentStatusRequest,
};
use crate::dto::response::{ApiResponse, BulkResult};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, IdPath, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<BookingQuery>,
) -> ApiResult<Json<ApiResponse<PageResponse<Booking>>>> {
    let filter = query.into_filter()?;
    let page = state.services.bookings.list(&auth, &filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> ApiResult<Json<ApiResponse<Booking>>> {
    let booking = state.services.bookings.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// PUT /bookings/{id}/status
pub async fn update_booking_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<BookingStatusRequest>,
) -> ApiResult<Json<ApiResponse<Booking>>> {
    let booking = state
        .services
        .bookings
        .update_status(&auth, id, req.status, req.cancellation_reason)
        .await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// PUT /bookings/{id}/payment-status
pub async fn update_payment_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<PaymentStatusRequest>,
) -> ApiResult<Json<ApiResponse<Booking>>> {
    let booking = state
        .services
        .bookings
        .update_payment_status(&auth, id, req.payment_status)
        .await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// POST /bookings/bulk/status
pub async fn bulk_update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<BulkBookingStatusRequest>,
) -> ApiResult<Json<ApiResponse<BulkResult>>> {
    let affected = state
        .services
        .bookings
        .bulk_update_status(&auth, &req.ids, req.status, req.cancellation_reason)
        .await?;
    Ok(Json(ApiResponse::ok(BulkResult { affected })))
}

/// GET /bookings/export?ids=…  or with the list filters.
///
/// Returns `text/csv` as an attachment.
pub async fn export_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<BookingQuery>,
) -> ApiResult<Response> {
    let selection = query.into_export_selection()?;
    let csv = state.services.bookings.export_csv(&auth, selection).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"bookings.csv\"",
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
