//! Blog category entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A blog category.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogCategory {
    /// Unique category identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    /// Description shown on the category page.
    pub description: Option<String>,
    /// Header image URL.
    pub image_url: Option<String>,
    /// Whether the category is listed publicly.
    pub is_active: bool,
    /// Position in navigation menus.
    pub display_order: i32,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
    /// Number of posts in the category (computed).
    pub post_count: i64,
}

/// Create/edit form for a blog category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BlogCategoryInput {
    /// Display name.
    #[validate(length(min = 2, max = 100, message = "Name must be 2 to 100 characters"))]
    pub name: String,
    /// Slug; derived from the name when blank. Always stored lowercased.
    #[serde(default)]
    pub slug: Option<String>,
    /// Description.
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Header image URL or `data:` URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Public visibility.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Menu position.
    #[serde(default)]
    pub display_order: i32,
}

fn default_active() -> bool {
    true
}
