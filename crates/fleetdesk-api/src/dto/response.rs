//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Result of a bulk write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BulkResult {
    /// Rows the statement changed. May be lower than the number of ids sent
    /// when some were missing or not owned by the caller.
    pub affected: u64,
}

/// Result of a single-row delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub id: uuid::Uuid,
    pub deleted: bool,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Active database backend (`postgres` or `memory`).
    pub database: String,
}
