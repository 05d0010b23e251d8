//! Repository traits and their PostgreSQL / in-memory implementations.

pub mod blog_category;
pub mod blog_post;
pub mod blog_tag;
pub mod booking;
pub mod currency;
pub mod reference;
pub mod review;
pub mod route;
pub mod vehicle;

use std::sync::Arc;

use sqlx::PgPool;

pub use blog_category::BlogCategoryRepository;
pub use blog_post::BlogPostRepository;
pub use blog_tag::BlogTagRepository;
pub use booking::{BookingRepository, EXPORT_LIMIT};
pub use currency::CurrencyRepository;
pub use reference::ReferenceRepository;
pub use review::ReviewRepository;
pub use route::RouteRepository;
pub use vehicle::VehicleRepository;

use crate::memory::MemoryDatabase;

/// One handle per resource, shared by the service layer.
#[derive(Clone)]
pub struct Repositories {
    pub bookings: Arc<dyn BookingRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub blog_posts: Arc<dyn BlogPostRepository>,
    pub blog_categories: Arc<dyn BlogCategoryRepository>,
    pub blog_tags: Arc<dyn BlogTagRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub routes: Arc<dyn RouteRepository>,
    pub currencies: Arc<dyn CurrencyRepository>,
    pub reference: Arc<dyn ReferenceRepository>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            bookings: Arc::new(booking::PgBookingRepository::new(pool.clone())),
            vehicles: Arc::new(vehicle::PgVehicleRepository::new(pool.clone())),
            blog_posts: Arc::new(blog_post::PgBlogPostRepository::new(pool.clone())),
            blog_categories: Arc::new(blog_category::PgBlogCategoryRepository::new(pool.clone())),
            blog_tags: Arc::new(blog_tag::PgBlogTagRepository::new(pool.clone())),
            reviews: Arc::new(review::PgReviewRepository::new(pool.clone())),
            routes: Arc::new(route::PgRouteRepository::new(pool.clone())),
            currencies: Arc::new(currency::PgCurrencyRepository::new(pool.clone())),
            reference: Arc::new(reference::PgReferenceRepository::new(pool)),
        }
    }

    /// Repositories backed by the shared in-memory tables.
    pub fn memory(db: Arc<MemoryDatabase>) -> Self {
        Self {
            bookings: Arc::new(booking::MemoryBookingRepository::new(db.clone())),
            vehicles: Arc::new(vehicle::MemoryVehicleRepository::new(db.clone())),
            blog_posts: Arc::new(blog_post::MemoryBlogPostRepository::new(db.clone())),
            blog_categories: Arc::new(blog_category::MemoryBlogCategoryRepository::new(db.clone())),
            blog_tags: Arc::new(blog_tag::MemoryBlogTagRepository::new(db.clone())),
            reviews: Arc::new(review::MemoryReviewRepository::new(db.clone())),
            routes: Arc::new(route::MemoryRouteRepository::new(db.clone())),
            currencies: Arc::new(currency::MemoryCurrencyRepository::new(db.clone())),
            reference: Arc::new(reference::MemoryReferenceRepository::new(db)),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
