//! Integration tests for zone pricing and the public quote.

mod helpers;

use http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use fleetdesk_entity::reference::VehicleType;

#[tokio::test]
async fn test_quote_uses_zone_price_and_multiplier() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let airport = app.db.add_zone("Airport");
    let ubud = app.db.add_zone("Ubud");
    let pickup = app.db.add_location("Ngurah Rai Airport", Some(airport));
    let dropoff = app.db.add_location("Ubud Center", Some(ubud));
    let van = app.db.add_vehicle_type(VehicleType {
        id: Uuid::new_v4(),
        name: "Van".to_string(),
        max_passengers: 8,
        price_multiplier: Decimal::new(15, 1),
    });

    let upsert = app
        .request(
            "PUT",
            "/api/admin/pricing/zones",
            Some(json!({
                "origin_zone_id": ubud,
                "destination_zone_id": airport,
                "base_price": "30.00",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(upsert.status, StatusCode::OK);

    // Prices apply in both directions.
    let response = app
        .request(
            "POST",
            "/api/public/quote",
            Some(json!({
                "origin_location_id": pickup,
                "destination_location_id": dropoff,
                "vehicle_type_id": van,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let total: Decimal = response.body["data"]["total_price"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(total, Decimal::new(4500, 2));
}

#[tokio::test]
async fn test_quote_without_zone_price_is_not_found() {
    let app = helpers::TestApp::new().await;

    let a = app.db.add_zone("North");
    let b = app.db.add_zone("South");
    let pickup = app.db.add_location("Harbour", Some(a));
    let dropoff = app.db.add_location("Old Town", Some(b));
    let sedan = app.db.add_vehicle_type(VehicleType {
        id: Uuid::new_v4(),
        name: "Sedan".to_string(),
        max_passengers: 4,
        price_multiplier: Decimal::ONE,
    });

    let response = app
        .request(
            "POST",
            "/api/public/quote",
            Some(json!({
                "origin_location_id": pickup,
                "destination_location_id": dropoff,
                "vehicle_type_id": sedan,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_negative_zone_price_rejected() {
    let app = helpers::TestApp::new().await;
    let token = app.admin_token();

    let response = app
        .request(
            "PUT",
            "/api/admin/pricing/zones",
            Some(json!({
                "origin_zone_id": app.db.add_zone("East"),
                "destination_zone_id": app.db.add_zone("West"),
                "base_price": "-1",
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["details"]["base_price"].is_array());
}
