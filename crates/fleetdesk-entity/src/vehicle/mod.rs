//! Vehicle domain entities.

pub mod filter;
pub mod model;

pub use filter::VehicleFilter;
pub use model::{FuelType, Transmission, Vehicle, VehicleInput};
