//! # fleetdesk-storage
//!
//! Media storage for FleetDesk. Images uploaded through the admin and vendor
//! APIs (multipart or inline `data:` URLs) are written to the local
//! filesystem or an S3-compatible bucket and addressed by public URL.

pub mod media;
pub mod providers;

pub use media::{MediaStore, UploadedMedia};
