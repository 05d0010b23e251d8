//! Route definitions for the FleetDesk HTTP API.
//!
//! `/api/admin` and `/api/vendor` sit behind a role guard; `/api/public`
//! and `/health` are open. The router receives `AppState` and passes it to
//! all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::handlers::{
    blog, bookings, currencies, health, media, pricing, reviews, routes, vehicles,
};
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let admin = Router::new()
        .merge(booking_routes())
        .merge(vehicle_routes())
        .merge(route_routes())
        .route("/routes/{id}/toggle-popular", post(routes::toggle_popular))
        .merge(blog_routes())
        .merge(review_routes())
        .merge(currency_routes())
        .merge(pricing_routes())
        .merge(shared_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rbac::require_admin,
        ));

    let vendor = Router::new()
        .merge(booking_routes())
        .merge(vehicle_routes())
        .merge(route_routes())
        .merge(shared_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rbac::require_vendor,
        ));

    let api = Router::new()
        .nest("/admin", admin)
        .nest("/vendor", vendor)
        .nest("/public", public_routes());

    Router::new()
        .nest("/api", api)
        .route("/health", get(health::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Bookings: list, detail, status writes, bulk status, CSV export.
fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(bookings::list_bookings))
        .route("/bookings/export", get(bookings::export_bookings))
        .route("/bookings/bulk/status", post(bookings::bulk_update_status))
        .route("/bookings/{id}", get(bookings::get_booking))
        .route("/bookings/{id}/status", put(bookings::update_booking_status))
        .route(
            "/bookings/{id}/payment-status",
            put(bookings::update_payment_status),
        )
}

/// Vehicles: CRUD, availability, bulk actions.
fn vehicle_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vehicles",
            get(vehicles::list_vehicles).post(vehicles::create_vehicle),
        )
        .route(
            "/vehicles/bulk/availability",
            post(vehicles::bulk_set_availability),
        )
        .route("/vehicles/bulk/delete", post(vehicles::bulk_delete))
        .route(
            "/vehicles/{id}",
            get(vehicles::get_vehicle)
                .put(vehicles::update_vehicle)
                .delete(vehicles::delete_vehicle),
        )
        .route(
            "/vehicles/{id}/toggle-availability",
            post(vehicles::toggle_availability),
        )
}

/// Routes: CRUD and activation. Promotion is admin-only and mounted separately.
fn route_routes() -> Router<AppState> {
    Router::new()
        .route("/routes", get(routes::list_routes).post(routes::create_route))
        .route(
            "/routes/{id}",
            get(routes::get_route)
                .put(routes::update_route)
                .delete(routes::delete_route),
        )
        .route("/routes/{id}/toggle-active", post(routes::toggle_active))
}

/// Blog posts, categories and tags.
fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/blog/posts", get(blog::list_posts).post(blog::create_post))
        .route("/blog/posts/bulk/status", post(blog::bulk_post_status))
        .route("/blog/posts/bulk/delete", post(blog::bulk_delete_posts))
        .route(
            "/blog/posts/{id}",
            get(blog::get_post)
                .put(blog::update_post)
                .delete(blog::delete_post),
        )
        .route(
            "/blog/posts/{id}/toggle-featured",
            post(blog::toggle_post_featured),
        )
        .route(
            "/blog/categories",
            get(blog::list_categories).post(blog::create_category),
        )
        .route(
            "/blog/categories/{id}",
            get(blog::get_category)
                .put(blog::update_category)
                .delete(blog::delete_category),
        )
        .route(
            "/blog/categories/{id}/toggle-active",
            post(blog::toggle_category_active),
        )
        .route("/blog/tags", get(blog::list_tags).post(blog::create_tag))
        .route(
            "/blog/tags/{id}",
            get(blog::get_tag)
                .put(blog::update_tag)
                .delete(blog::delete_tag),
        )
}

/// Review moderation.
fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(reviews::list_reviews))
        .route("/reviews/bulk/status", post(reviews::bulk_set_status))
        .route("/reviews/bulk/delete", post(reviews::bulk_delete))
        .route(
            "/reviews/{id}",
            get(reviews::get_review).delete(reviews::delete_review),
        )
        .route("/reviews/{id}/status", put(reviews::set_status))
        .route("/reviews/{id}/response", put(reviews::respond))
        .route("/reviews/{id}/toggle-featured", post(reviews::toggle_featured))
}

/// Currencies.
fn currency_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/currencies",
            get(currencies::list_currencies).post(currencies::create_currency),
        )
        .route(
            "/currencies/{id}",
            get(currencies::get_currency)
                .put(currencies::update_currency)
                .delete(currencies::delete_currency),
        )
        .route(
            "/currencies/{id}/toggle-active",
            post(currencies::toggle_active),
        )
        .route("/currencies/{id}/default", post(currencies::set_default))
}

/// Zone pricing.
fn pricing_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/pricing/zones",
            get(pricing::list_zone_prices).put(pricing::upsert_zone_price),
        )
        .route("/pricing/zones/{id}", delete(pricing::delete_zone_price))
}

/// Media upload and form options, available to both admins and vendors.
fn shared_routes() -> Router<AppState> {
    Router::new()
        .route("/media", post(media::upload))
        .route("/form-options", get(pricing::form_options))
}

/// Read-only data for the booking site.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/blog", get(blog::public_posts))
        .route("/blog/{slug}", get(blog::public_post))
        .route("/reviews", get(reviews::public_featured))
        .route("/routes", get(routes::public_routes))
        .route("/currencies", get(currencies::public_currencies))
        .route("/locations", get(pricing::public_locations))
        .route("/quote", post(pricing::quote))
}
