//! Vehicle entity model.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

db_enum! {
    /// Fuel / drive type.
    pub enum FuelType ("fuel_type", "fuel type") {
        /// Petrol engine.
        Petrol => "petrol",
        /// Diesel engine.
        Diesel => "diesel",
        /// Battery electric.
        Electric => "electric",
        /// Hybrid drive.
        Hybrid => "hybrid",
    }
}

db_enum! {
    /// Gearbox type.
    pub enum Transmission ("transmission_type", "transmission") {
        /// Manual gearbox.
        Manual => "manual",
        /// Automatic gearbox.
        Automatic => "automatic",
    }
}

/// A vehicle in a vendor's fleet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    /// Unique vehicle identifier.
    pub id: Uuid,
    /// Owning vendor.
    pub business_id: Uuid,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: i32,
    /// Registration plate, upper-cased.
    pub registration_number: String,
    /// Paint colour.
    pub color: Option<String>,
    /// Vehicle category (sedan, van, …).
    pub category_id: Option<Uuid>,
    /// Vehicle type used for pricing.
    pub vehicle_type_id: Option<Uuid>,
    /// Fuel type.
    pub fuel_type: FuelType,
    /// Transmission.
    pub transmission: Transmission,
    /// Passenger seats.
    pub seats: i32,
    /// Luggage capacity in standard bags.
    pub luggage_capacity: i32,
    /// Public image URLs.
    pub image_urls: Vec<String>,
    /// Whether the vehicle can be assigned to bookings.
    pub is_available: bool,
    /// When the vehicle was created.
    pub created_at: DateTime<Utc>,
    /// When the vehicle was last updated.
    pub updated_at: DateTime<Utc>,
    /// Vendor name (joined).
    pub business_name: Option<String>,
    /// Category name (joined).
    pub category_name: Option<String>,
    /// Vehicle type name (joined).
    pub vehicle_type_name: Option<String>,
}

/// Create/edit form for a vehicle.
///
/// `image_urls` entries may be `data:` URLs; they are uploaded and replaced
/// with public URLs before the row is written.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VehicleInput {
    /// Owning vendor. Required when an administrator creates the vehicle,
    /// ignored for vendors.
    #[serde(default)]
    pub business_id: Option<Uuid>,
    /// Manufacturer.
    #[validate(length(min = 1, max = 100, message = "Make is required"))]
    pub make: String,
    /// Model name.
    #[validate(length(min = 1, max = 100, message = "Model is required"))]
    pub model: String,
    /// Model year.
    #[validate(custom(function = "model_year"))]
    pub year: i32,
    /// Registration plate.
    #[validate(length(min = 2, max = 20, message = "Registration number is required"))]
    pub registration_number: String,
    /// Paint colour.
    #[serde(default)]
    #[validate(length(max = 50))]
    pub color: Option<String>,
    /// Vehicle category.
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Vehicle type.
    #[serde(default)]
    pub vehicle_type_id: Option<Uuid>,
    /// Fuel type.
    pub fuel_type: FuelType,
    /// Transmission.
    pub transmission: Transmission,
    /// Passenger seats.
    #[validate(range(min = 1, max = 60, message = "Seats must be between 1 and 60"))]
    pub seats: i32,
    /// Luggage capacity.
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub luggage_capacity: i32,
    /// Image URLs or `data:` URLs.
    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 images"))]
    pub image_urls: Vec<String>,
    /// Availability flag.
    #[serde(default = "default_available")]
    pub is_available: bool,
}

impl VehicleInput {
    /// Trim text fields, upper-case the plate, and drop blank optionals.
    pub fn normalize(&mut self) {
        self.make = self.make.trim().to_string();
        self.model = self.model.trim().to_string();
        self.registration_number = self.registration_number.trim().to_uppercase();
        self.color = fleetdesk_core::text::blank_to_none(self.color.take());
        self.image_urls.retain(|url| !url.trim().is_empty());
    }
}

fn default_available() -> bool {
    true
}

fn model_year(year: i32) -> Result<(), ValidationError> {
    let latest = Utc::now().year() + 1;
    if !(1990..=latest).contains(&year) {
        let mut err = ValidationError::new("year");
        err.message = Some(format!("Year must be between 1990 and {latest}").into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> VehicleInput {
        VehicleInput {
            business_id: None,
            make: " Toyota ".into(),
            model: "Hiace".into(),
            year: 2022,
            registration_number: " dk 1234 ab ".into(),
            color: Some("  ".into()),
            category_id: None,
            vehicle_type_id: None,
            fuel_type: FuelType::Diesel,
            transmission: Transmission::Manual,
            seats: 12,
            luggage_capacity: 10,
            image_urls: vec!["".into(), "https://cdn/x.jpg".into()],
            is_available: true,
        }
    }

    #[test]
    fn test_normalize() {
        let mut input = input();
        input.normalize();
        assert_eq!(input.make, "Toyota");
        assert_eq!(input.registration_number, "DK 1234 AB");
        assert_eq!(input.color, None);
        assert_eq!(input.image_urls.len(), 1);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut input = input();
        input.year = 1970;
        input.seats = 0;
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("year"));
        assert!(fields.contains_key("seats"));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Electric".parse::<FuelType>().unwrap(), FuelType::Electric);
        assert!("cvt".parse::<Transmission>().is_err());
    }
}
