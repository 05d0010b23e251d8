//! Blog post publication status.

use chrono::{DateTime, Utc};

db_enum! {
    /// Publication state of a blog post.
    pub enum PostStatus ("post_status", "post status") {
        /// Work in progress, not public.
        Draft => "draft",
        /// Publicly visible.
        Published => "published",
        /// Withdrawn from the public site.
        Archived => "archived",
    }
}

impl PostStatus {
    /// `published_at` after a write that leaves the post in `self`.
    ///
    /// The timestamp is set on the first transition into `Published` and is
    /// never moved afterwards.
    pub fn published_at(
        &self,
        current: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match (self, current) {
            (Self::Published, None) => Some(now),
            (_, current) => current,
        }
    }
}
