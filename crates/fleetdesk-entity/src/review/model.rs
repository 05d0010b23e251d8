//! Review entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

db_enum! {
    /// Moderation state of a review.
    pub enum ReviewStatus ("review_status", "review status") {
        /// Awaiting moderation.
        Pending => "pending",
        /// Visible on the public site.
        Approved => "approved",
        /// Hidden.
        Rejected => "rejected",
    }
}

/// A customer's review of a completed trip.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    /// Unique review identifier.
    pub id: Uuid,
    /// Reviewer.
    pub customer_id: Uuid,
    /// The reviewed booking.
    pub booking_id: Option<Uuid>,
    /// Star rating, 1 to 5.
    pub rating: i32,
    /// Optional headline.
    pub title: Option<String>,
    /// Review body.
    pub review_text: String,
    /// Moderation status.
    pub status: ReviewStatus,
    /// Shown on the home page.
    pub is_featured: bool,
    /// Public reply from the operator.
    pub admin_response: Option<String>,
    /// Who wrote the reply.
    pub responded_by: Option<Uuid>,
    /// When the reply was written.
    pub responded_at: Option<DateTime<Utc>>,
    /// When the review was submitted.
    pub created_at: DateTime<Utc>,
    /// When the review was last updated.
    pub updated_at: DateTime<Utc>,
    /// Reviewer display name (joined).
    pub customer_name: Option<String>,
}

/// Operator reply to a review.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewResponseInput {
    /// Reply text.
    #[validate(length(min = 1, max = 2000, message = "Response must be 1 to 2000 characters"))]
    pub response: String,
}
