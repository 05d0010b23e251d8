//! # fleetdesk-entity
//!
//! Domain entity models for FleetDesk. Every struct in this crate represents
//! a database row, a write input, or a typed list filter. Row types derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and `sqlx::FromRow`; joined
//! display columns (customer name, category name, …) are part of the row.

#[macro_use]
mod macros;

pub mod blog;
pub mod booking;
pub mod currency;
pub mod reference;
pub mod review;
pub mod route;
pub mod validation;
pub mod vehicle;
