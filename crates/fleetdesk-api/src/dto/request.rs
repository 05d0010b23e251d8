//! Request DTOs: list query strings and action bodies.
//!
//! Query parameters are taken as raw strings and parsed into the typed
//! filters from `fleetdesk-entity`. A blank value or `all` means "no filter";
//! anything else that does not parse is a 422 naming the parameter.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use fleetdesk_core::error::AppError;
use fleetdesk_core::result::AppResult;
use fleetdesk_core::types::params::{
    parse_bool, parse_date_end, parse_date_start, parse_enum, parse_number, parse_uuid, present,
};
use fleetdesk_core::types::{BulkIds, ListParams, SortField};
use fleetdesk_entity::blog::filter::{CATEGORY_SORT_KEYS, POST_SORT_KEYS, TAG_SORT_KEYS};
use fleetdesk_entity::blog::{BlogCategoryFilter, BlogPostFilter, BlogTagFilter, PostStatus};
use fleetdesk_entity::booking::filter::BOOKING_SORT_KEYS;
use fleetdesk_entity::booking::{BookingFilter, BookingStatus, PaymentStatus};
use fleetdesk_entity::currency::CurrencyFilter;
use fleetdesk_entity::currency::model::CURRENCY_SORT_KEYS;
use fleetdesk_entity::reference::{ZONE_PRICE_SORT_KEYS, ZonePriceFilter};
use fleetdesk_entity::review::filter::REVIEW_SORT_KEYS;
use fleetdesk_entity::review::{ReviewFilter, ReviewStatus};
use fleetdesk_entity::route::RouteFilter;
use fleetdesk_entity::route::filter::ROUTE_SORT_KEYS;
use fleetdesk_entity::vehicle::VehicleFilter;
use fleetdesk_entity::vehicle::filter::VEHICLE_SORT_KEYS;
use fleetdesk_service::ExportSelection;

/// `GET /bookings` and `GET /bookings/export`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingQuery {
    #[serde(flatten)]
    pub list: ListParams,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub business_id: Option<String>,
    pub customer_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// Export only: comma-separated booking ids. Overrides the filter.
    pub ids: Option<String>,
}

impl BookingQuery {
    pub fn into_filter(self) -> AppResult<BookingFilter> {
        Ok(BookingFilter {
            search: self.list.search().map(str::to_string),
            status: parse_enum::<BookingStatus>("status", self.status.as_deref())?,
            payment_status: parse_enum::<PaymentStatus>(
                "payment_status",
                self.payment_status.as_deref(),
            )?,
            business_id: parse_uuid("business_id", self.business_id.as_deref())?,
            customer_id: parse_uuid("customer_id", self.customer_id.as_deref())?,
            date_from: parse_date_start("date_from", self.date_from.as_deref())?,
            date_to: parse_date_end("date_to", self.date_to.as_deref())?,
            sort: self.list.sort_field(BOOKING_SORT_KEYS, SortField::newest_first())?,
            page: self.list.page_request()?,
        })
    }

    /// Selected ids when present, otherwise the current filter.
    pub fn into_export_selection(mut self) -> AppResult<ExportSelection> {
        match self.ids.take() {
            Some(raw) if present(Some(&raw)).is_some() => {
                let ids = parse_id_list("ids", &raw)?;
                Ok(ExportSelection::Ids(BulkIds::new(ids)?))
            }
            _ => self.into_filter().map(ExportSelection::Filter),
        }
    }
}

/// `GET /vehicles`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleQuery {
    #[serde(flatten)]
    pub list: ListParams,
    pub business_id: Option<String>,
    pub category_id: Option<String>,
    pub vehicle_type_id: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub is_available: Option<String>,
}

impl VehicleQuery {
    pub fn into_filter(self) -> AppResult<VehicleFilter> {
        Ok(VehicleFilter {
            search: self.list.search().map(str::to_string),
            business_id: parse_uuid("business_id", self.business_id.as_deref())?,
            category_id: parse_uuid("category_id", self.category_id.as_deref())?,
            vehicle_type_id: parse_uuid("vehicle_type_id", self.vehicle_type_id.as_deref())?,
            fuel_type: parse_enum("fuel_type", self.fuel_type.as_deref())?,
            transmission: parse_enum("transmission", self.transmission.as_deref())?,
            is_available: parse_bool("is_available", self.is_available.as_deref())?,
            sort: self.list.sort_field(VEHICLE_SORT_KEYS, SortField::newest_first())?,
            page: self.list.page_request()?,
        })
    }
}

/// `GET /blog/posts`, admin and public.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostQuery {
    #[serde(flatten)]
    pub list: ListParams,
    pub status: Option<String>,
    pub category_id: Option<String>,
    pub is_featured: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl BlogPostQuery {
    pub fn into_filter(self) -> AppResult<BlogPostFilter> {
        Ok(BlogPostFilter {
            search: self.list.search().map(str::to_string),
            status: parse_enum::<PostStatus>("status", self.status.as_deref())?,
            category_id: parse_uuid("category_id", self.category_id.as_deref())?,
            is_featured: parse_bool("is_featured", self.is_featured.as_deref())?,
            date_from: parse_date_start("date_from", self.date_from.as_deref())?,
            date_to: parse_date_end("date_to", self.date_to.as_deref())?,
            sort: self.list.sort_field(POST_SORT_KEYS, SortField::newest_first())?,
            page: self.list.page_request()?,
        })
    }
}

/// `GET /blog/categories`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogCategoryQuery {
    #[serde(flatten)]
    pub list: ListParams,
    pub is_active: Option<String>,
}

impl BlogCategoryQuery {
    pub fn into_filter(self) -> AppResult<BlogCategoryFilter> {
        Ok(BlogCategoryFilter {
            search: self.list.search().map(str::to_string),
            is_active: parse_bool("is_active", self.is_active.as_deref())?,
            sort: self.list.sort_field(CATEGORY_SORT_KEYS, SortField::newest_first())?,
            page: self.list.page_request()?,
        })
    }
}

/// `GET /blog/tags`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogTagQuery {
    #[serde(flatten)]
    pub list: ListParams,
}

impl BlogTagQuery {
    pub fn into_filter(self) -> AppResult<BlogTagFilter> {
        Ok(BlogTagFilter {
            search: self.list.search().map(str::to_string),
            sort: self.list.sort_field(TAG_SORT_KEYS, SortField::newest_first())?,
            page: self.list.page_request()?,
        })
    }
}

/// `GET /reviews`, admin and public.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewQuery {
    #[serde(flatten)]
    pub list: ListParams,
    pub status: Option<String>,
    pub rating: Option<String>,
    pub is_featured: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl ReviewQuery {
    pub fn into_filter(self) -> AppResult<ReviewFilter> {
        let rating = parse_number::<i32>("rating", self.rating.as_deref())?;
        if rating.is_some_and(|r| r > 5) {
            return Err(AppError::invalid_field("rating", "Rating must be between 1 and 5"));
        }
        Ok(ReviewFilter {
            search: self.list.search().map(str::to_string),
            status: parse_enum::<ReviewStatus>("status", self.status.as_deref())?,
            rating,
            is_featured: parse_bool("is_featured", self.is_featured.as_deref())?,
            date_from: parse_date_start("date_from", self.date_from.as_deref())?,
            date_to: parse_date_end("date_to", self.date_to.as_deref())?,
            sort: self.list.sort_field(REVIEW_SORT_KEYS, SortField::newest_first())?,
            page: self.list.page_request()?,
        })
    }
}

/// `GET /routes`, admin, vendor and public.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteQuery {
    #[serde(flatten)]
    pub list: ListParams,
    pub origin_location_id: Option<String>,
    pub destination_location_id: Option<String>,
    pub created_by_type: Option<String>,
    pub is_active: Option<String>,
    pub is_popular: Option<String>,
}

impl RouteQuery {
    pub fn into_filter(self) -> AppResult<RouteFilter> {
        Ok(RouteFilter {
            search: self.list.search().map(str::to_string),
            origin_location_id: parse_uuid(
                "origin_location_id",
                self.origin_location_id.as_deref(),
            )?,
            destination_location_id: parse_uuid(
                "destination_location_id",
                self.destination_location_id.as_deref(),
            )?,
            created_by_type: parse_enum("created_by_type", self.created_by_type.as_deref())?,
            is_active: parse_bool("is_active", self.is_active.as_deref())?,
            is_popular: parse_bool("is_popular", self.is_popular.as_deref())?,
            sort: self.list.sort_field(ROUTE_SORT_KEYS, SortField::newest_first())?,
            page: self.list.page_request()?,
        })
    }
}

/// `GET /currencies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrencyQuery {
    #[serde(flatten)]
    pub list: ListParams,
    pub is_active: Option<String>,
}

impl CurrencyQuery {
    pub fn into_filter(self) -> AppResult<CurrencyFilter> {
        Ok(CurrencyFilter {
            search: self.list.search().map(str::to_string),
            is_active: parse_bool("is_active", self.is_active.as_deref())?,
            sort: self.list.sort_field(CURRENCY_SORT_KEYS, SortField::asc("code"))?,
            page: self.list.page_request()?,
        })
    }
}

/// `GET /pricing/zones`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZonePriceQuery {
    #[serde(flatten)]
    pub list: ListParams,
    pub origin_zone_id: Option<String>,
}

impl ZonePriceQuery {
    pub fn into_filter(self) -> AppResult<ZonePriceFilter> {
        Ok(ZonePriceFilter {
            search: self.list.search().map(str::to_string),
            origin_zone_id: parse_uuid("origin_zone_id", self.origin_zone_id.as_deref())?,
            sort: self.list.sort_field(ZONE_PRICE_SORT_KEYS, SortField::newest_first())?,
            page: self.list.page_request()?,
        })
    }
}

fn parse_id_list(field: &str, raw: &str) -> AppResult<Vec<Uuid>> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            parse_uuid(field, Some(part))?
                .ok_or_else(|| AppError::invalid_field(field, "Empty id"))
        })
        .collect()
}

// ── Action bodies ────────────────────────────────────────────────

/// `PUT /bookings/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingStatusRequest {
    pub status: BookingStatus,
    /// Required when `status` is `cancelled`.
    #[serde(default)]
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub cancellation_reason: Option<String>,
}

/// `PUT /bookings/{id}/payment-status`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// `POST /bookings/bulk/status`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkBookingStatusRequest {
    pub ids: BulkIds,
    pub status: BookingStatus,
    #[serde(default)]
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub cancellation_reason: Option<String>,
}

/// Bulk delete body shared by every resource.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkIdsRequest {
    pub ids: BulkIds,
}

/// `POST /vehicles/bulk/availability`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkAvailabilityRequest {
    pub ids: BulkIds,
    pub is_available: bool,
}

/// `POST /blog/posts/bulk/status`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkPostStatusRequest {
    pub ids: BulkIds,
    pub status: PostStatus,
}

/// `PUT /reviews/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewStatusRequest {
    pub status: ReviewStatus,
}

/// `POST /reviews/bulk/status`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkReviewStatusRequest {
    pub ids: BulkIds,
    pub status: ReviewStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdesk_core::types::PageRequest;

    fn list(page: &str, limit: &str) -> ListParams {
        ListParams {
            page: Some(page.into()),
            limit: Some(limit.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_and_blank_mean_unfiltered() {
        let query = BookingQuery {
            status: Some("all".into()),
            payment_status: Some("".into()),
            date_from: Some("  ".into()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert!(filter.status.is_none());
        assert!(filter.payment_status.is_none());
        assert!(filter.date_from.is_none());
        assert_eq!(filter.page, PageRequest::default());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let query = BookingQuery {
            status: Some("shipped".into()),
            ..Default::default()
        };
        let err = query.into_filter().unwrap_err();
        assert!(err.details.unwrap().get("status").is_some());
    }

    #[test]
    fn test_unknown_sort_key_is_rejected() {
        let query = VehicleQuery {
            list: ListParams {
                sort: Some("password".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn test_paging_is_parsed() {
        let query = BlogPostQuery {
            list: list("3", "10"),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.page, PageRequest::new(3, 10));
    }

    #[test]
    fn test_export_prefers_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let query = BookingQuery {
            ids: Some(format!("{a}, {b},{a}")),
            status: Some("pending".into()),
            ..Default::default()
        };
        match query.into_export_selection().unwrap() {
            ExportSelection::Ids(ids) => assert_eq!(ids.as_slice(), &[a, b]),
            other => panic!("expected ids, got {other:?}"),
        }
    }

    #[test]
    fn test_export_without_ids_uses_filter() {
        let query = BookingQuery {
            ids: Some("".into()),
            status: Some("confirmed".into()),
            ..Default::default()
        };
        match query.into_export_selection().unwrap() {
            ExportSelection::Filter(f) => assert_eq!(f.status, Some(BookingStatus::Confirmed)),
            other => panic!("expected filter, got {other:?}"),
        }
    }

    #[test]
    fn test_rating_out_of_range() {
        let query = ReviewQuery {
            rating: Some("6".into()),
            ..Default::default()
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn test_bulk_body_rejects_empty_ids() {
        let result: Result<BulkIdsRequest, _> = serde_json::from_str(r#"{"ids": []}"#);
        assert!(result.is_err());
    }
}
