//! Blog post entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::status::PostStatus;

/// A blog article.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlogPost {
    /// Unique post identifier.
    pub id: Uuid,
    /// Headline.
    pub title: String,
    /// Unique URL slug.
    pub slug: String,
    /// Short summary for cards and meta tags.
    pub excerpt: Option<String>,
    /// Body (HTML).
    pub content: String,
    /// Cover image URL.
    pub featured_image: Option<String>,
    /// Category.
    pub category_id: Option<Uuid>,
    /// Author account.
    pub author_id: Option<Uuid>,
    /// Publication status.
    pub status: PostStatus,
    /// Shown in the featured slot.
    pub is_featured: bool,
    /// Estimated reading time in minutes.
    pub reading_time: i32,
    /// SEO title override.
    pub meta_title: Option<String>,
    /// SEO description override.
    pub meta_description: Option<String>,
    /// First time the post went live.
    pub published_at: Option<DateTime<Utc>>,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// When the post was last updated.
    pub updated_at: DateTime<Utc>,
    /// Category name (joined).
    pub category_name: Option<String>,
    /// Attached tag ids (joined).
    pub tag_ids: Vec<Uuid>,
    /// Attached tag names (joined).
    pub tag_names: Vec<String>,
}

/// Create/edit form for a blog post.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BlogPostInput {
    /// Headline.
    #[validate(length(min = 3, max = 200, message = "Title must be 3 to 200 characters"))]
    pub title: String,
    /// Slug; derived from the title when blank.
    #[serde(default)]
    pub slug: Option<String>,
    /// Short summary.
    #[serde(default)]
    #[validate(length(max = 500))]
    pub excerpt: Option<String>,
    /// Body (HTML).
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    /// Cover image URL or `data:` URL.
    #[serde(default)]
    pub featured_image: Option<String>,
    /// Category.
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Publication status.
    #[serde(default = "default_status")]
    pub status: PostStatus,
    /// Featured flag.
    #[serde(default)]
    pub is_featured: bool,
    /// SEO title override.
    #[serde(default)]
    #[validate(length(max = 70))]
    pub meta_title: Option<String>,
    /// SEO description override.
    #[serde(default)]
    #[validate(length(max = 160))]
    pub meta_description: Option<String>,
    /// Tags to attach; replaces the current set.
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

fn default_status() -> PostStatus {
    PostStatus::Draft
}

/// A fully resolved post write: slug normalised, reading time computed,
/// image uploaded.
#[derive(Debug, Clone)]
pub struct BlogPostData {
    /// Headline.
    pub title: String,
    /// Normalised slug.
    pub slug: String,
    /// Short summary.
    pub excerpt: Option<String>,
    /// Body.
    pub content: String,
    /// Public cover image URL.
    pub featured_image: Option<String>,
    /// Category.
    pub category_id: Option<Uuid>,
    /// Author (set on create only).
    pub author_id: Option<Uuid>,
    /// Publication status.
    pub status: PostStatus,
    /// Featured flag.
    pub is_featured: bool,
    /// Reading time in minutes.
    pub reading_time: i32,
    /// SEO title.
    pub meta_title: Option<String>,
    /// SEO description.
    pub meta_description: Option<String>,
    /// Tags, de-duplicated.
    pub tag_ids: Vec<Uuid>,
}
