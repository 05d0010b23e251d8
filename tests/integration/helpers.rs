//! Shared test helpers for integration tests.
//!
//! Every `TestApp` runs the full router over the in-memory database, an
//! in-process page cache, and media written to a temporary directory.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{Duration, Utc};
use http::{HeaderMap, Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use fleetdesk_api::AppState;
use fleetdesk_auth::{JwtEncoder, RbacEnforcer, UserRole};
use fleetdesk_cache::{CacheManager, Revalidator};
use fleetdesk_core::config::AppConfig;
use fleetdesk_database::{MemoryDatabase, Repositories};
use fleetdesk_entity::booking::{Booking, BookingStatus, PaymentStatus};
use fleetdesk_service::Services;
use fleetdesk_storage::MediaStore;
use fleetdesk_storage::providers::LocalStorageProvider;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store, for seeding and direct assertions
    pub db: Arc<MemoryDatabase>,
    /// Application config
    pub config: AppConfig,
    _media_root: TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.provider = "memory".to_string();
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let media_root = tempfile::tempdir().expect("Failed to create media dir");
        config.storage.local.root_path = media_root.path().display().to_string();

        let db = Arc::new(MemoryDatabase::new());
        let provider = Arc::new(
            LocalStorageProvider::new(media_root.path())
                .await
                .expect("Failed to init storage"),
        );
        let media = MediaStore::new(provider, &config.storage);
        let pages = Revalidator::new(CacheManager::in_memory());

        let services = Services::new(
            Repositories::memory(db.clone()),
            pages,
            media,
            Arc::new(RbacEnforcer::new()),
        );
        let state = AppState::new(config.clone(), services);
        let router = fleetdesk_api::build_app(state, &config.server.cors);

        Self {
            router,
            db,
            config,
            _media_root: media_root,
        }
    }

    /// Mint a bearer token for an admin.
    pub fn admin_token(&self) -> String {
        JwtEncoder::new(&self.config.auth)
            .issue(Uuid::new_v4(), UserRole::Admin, None)
            .expect("Failed to mint admin token")
    }

    /// Seed a business and mint a vendor token for it.
    pub fn vendor_token(&self, business_name: &str) -> (Uuid, String) {
        let business_id = self.db.add_business(business_name);
        let token = JwtEncoder::new(&self.config.auth)
            .issue(Uuid::new_v4(), UserRole::Vendor, Some(business_id))
            .expect("Failed to mint vendor token");
        (business_id, token)
    }

    /// Seed `count` pending bookings, the newest last.
    pub fn seed_bookings(&self, count: u32, business_id: Option<Uuid>) -> Vec<Booking> {
        let customer_id = self.db.add_customer("Ann Walker", "ann@example.com");
        let start = Utc::now() - Duration::days(i64::from(count));

        (1..=count)
            .map(|n| {
                let at = start + Duration::days(i64::from(n));
                self.db.bookings.insert(Booking {
                    id: Uuid::new_v4(),
                    booking_number: format!("BK-20250301-{n:06}"),
                    customer_id,
                    business_id,
                    vehicle_type_id: None,
                    pickup_address: "Ngurah Rai Airport".into(),
                    dropoff_address: "Ubud".into(),
                    pickup_datetime: at + Duration::days(7),
                    dropoff_datetime: None,
                    passenger_count: 2,
                    luggage_count: 1,
                    base_price: Decimal::new(3500, 2),
                    amenities_price: Decimal::ZERO,
                    total_price: Decimal::new(3500, 2),
                    currency_code: "USD".into(),
                    booking_status: BookingStatus::Pending,
                    payment_status: PaymentStatus::Pending,
                    cancellation_reason: None,
                    cancelled_at: None,
                    paid_at: None,
                    notes: None,
                    created_at: at,
                    updated_at: at,
                    customer_name: None,
                    customer_email: None,
                    vehicle_type_name: None,
                })
            })
            .collect()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` for non-JSON responses
    pub body: Value,
    /// Raw body text
    pub text: String,
}
