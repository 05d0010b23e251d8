//! Service wiring.

use std::sync::Arc;

use fleetdesk_auth::RbacEnforcer;
use fleetdesk_cache::Revalidator;
use fleetdesk_database::Repositories;
use fleetdesk_storage::MediaStore;

use crate::blog::{BlogCategoryService, BlogPostService, BlogTagService};
use crate::booking::BookingService;
use crate::currency::CurrencyService;
use crate::media::MediaService;
use crate::pricing::PricingService;
use crate::review::ReviewService;
use crate::route::RouteService;
use crate::vehicle::VehicleService;

/// Every service, built over one set of repositories.
#[derive(Clone)]
pub struct Services {
    pub bookings: BookingService,
    pub vehicles: VehicleService,
    pub blog_posts: BlogPostService,
    pub blog_categories: BlogCategoryService,
    pub blog_tags: BlogTagService,
    pub reviews: ReviewService,
    pub routes: RouteService,
    pub currencies: CurrencyService,
    pub pricing: PricingService,
    pub media: MediaService,
    /// Page cache shared by all services.
    pub pages: Revalidator,
}

impl Services {
    /// Wire the services.
    pub fn new(
        repos: Repositories,
        pages: Revalidator,
        media: MediaStore,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            bookings: BookingService::new(repos.bookings.clone(), pages.clone(), rbac.clone()),
            vehicles: VehicleService::new(
                repos.vehicles.clone(),
                media.clone(),
                pages.clone(),
                rbac.clone(),
            ),
            blog_posts: BlogPostService::new(
                repos.blog_posts.clone(),
                media.clone(),
                pages.clone(),
                rbac.clone(),
            ),
            blog_categories: BlogCategoryService::new(
                repos.blog_categories.clone(),
                repos.blog_posts.clone(),
                media.clone(),
                pages.clone(),
                rbac.clone(),
            ),
            blog_tags: BlogTagService::new(
                repos.blog_tags.clone(),
                repos.blog_posts.clone(),
                pages.clone(),
                rbac.clone(),
            ),
            reviews: ReviewService::new(repos.reviews.clone(), pages.clone(), rbac.clone()),
            routes: RouteService::new(
                repos.routes.clone(),
                repos.reference.clone(),
                pages.clone(),
                rbac.clone(),
            ),
            currencies: CurrencyService::new(repos.currencies.clone(), pages.clone(), rbac.clone()),
            pricing: PricingService::new(repos.reference.clone(), pages.clone(), rbac.clone()),
            media: MediaService::new(media, rbac),
            pages,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}
