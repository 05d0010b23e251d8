//! Blog tag entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A blog tag.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogTag {
    /// Unique tag identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    /// When the tag was created.
    pub created_at: DateTime<Utc>,
    /// When the tag was last updated.
    pub updated_at: DateTime<Utc>,
    /// Number of posts carrying the tag (computed).
    pub post_count: i64,
}

/// Create/edit form for a blog tag.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BlogTagInput {
    /// Display name.
    #[validate(length(min = 1, max = 50, message = "Name must be 1 to 50 characters"))]
    pub name: String,
    /// Slug; derived from the name when blank.
    #[serde(default)]
    pub slug: Option<String>,
}
