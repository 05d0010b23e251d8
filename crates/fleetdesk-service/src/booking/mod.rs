//! Booking management: lists, status writes, and CSV export.

pub mod export;
pub mod service;

pub use export::{ExportSelection, write_csv};
pub use service::BookingService;
