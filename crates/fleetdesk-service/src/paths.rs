//! Cached page paths and tags.
//!
//! A mutation revalidates every path that could render the changed row.
//! Detail pages live under their list path, so evicting the list path also
//! evicts them.

pub const ADMIN_BOOKINGS: &str = "/admin/bookings";
pub const VENDOR_BOOKINGS: &str = "/vendor/bookings";

pub const ADMIN_VEHICLES: &str = "/admin/vehicles";
pub const VENDOR_VEHICLES: &str = "/vendor/vehicles";

pub const ADMIN_BLOG_POSTS: &str = "/admin/blog/posts";
pub const ADMIN_BLOG_CATEGORIES: &str = "/admin/blog/categories";
pub const ADMIN_BLOG_TAGS: &str = "/admin/blog/tags";
pub const PUBLIC_BLOG: &str = "/blog";

pub const ADMIN_REVIEWS: &str = "/admin/reviews";
pub const PUBLIC_REVIEWS: &str = "/reviews";

pub const ADMIN_ROUTES: &str = "/admin/routes";
pub const VENDOR_ROUTES: &str = "/vendor/routes";
pub const PUBLIC_ROUTES: &str = "/routes";

pub const ADMIN_CURRENCIES: &str = "/admin/currencies";
pub const PUBLIC_CURRENCIES: &str = "/currencies";

pub const ADMIN_ZONE_PRICES: &str = "/admin/pricing/zones";

/// Tags for pages that join names from another resource.
pub mod tags {
    /// Pages showing category names or counts.
    pub const BLOG_CATEGORIES: &str = "blog-categories";
    /// Pages showing tag names or counts.
    pub const BLOG_TAGS: &str = "blog-tags";
}

/// Path of one row under a list path.
pub fn detail(base: &str, key: impl std::fmt::Display) -> String {
    format!("{base}/{key}")
}
