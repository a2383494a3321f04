//! API route configuration.
//!
//! Token endpoints are public. Everything else requires a Bearer access
//! token via [`crate::api::middleware::auth::layer`]; `/admin/*` also
//! requires a staff account.

use crate::api::handlers::{
    add_car_image_handler, admin_payment_list_handler, admin_rental_list_handler,
    cancel_rental_handler, car_detail_handler, car_list_handler, create_car_handler,
    create_payment_handler, create_rental_handler, delete_car_handler, delete_car_image_handler,
    mark_payment_paid_handler, refresh_handler, rental_detail_handler, rental_list_handler,
    token_handler, update_car_handler, update_rental_status_handler,
};
use crate::api::middleware::auth;
use crate::api::middleware::rate_limit::{self, Tier};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

/// Token issuance.
///
/// - `POST /token`         - Username/password login
/// - `POST /token/refresh` - New access token from a refresh token
pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(token_handler))
        .route("/token/refresh", post(refresh_handler))
}

/// Routes for any authenticated user.
///
/// - `GET  /cars`                 - Car catalogue (paginated, filterable, cached)
/// - `GET  /cars/{id}`            - Single car
/// - `GET  /rentals`              - Caller's rentals (paginated)
/// - `POST /rentals`              - Book a car
/// - `GET  /rentals/{id}`         - One of the caller's rentals
/// - `POST /rentals/{id}/cancel`  - Cancel a pending rental
/// - `POST /payments`             - Pay for a rental
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/cars", get(car_list_handler))
        .route("/cars/{id}", get(car_detail_handler))
        .route(
            "/rentals",
            get(rental_list_handler).post(create_rental_handler),
        )
        .route("/rentals/{id}", get(rental_detail_handler))
        .route("/rentals/{id}/cancel", post(cancel_rental_handler))
        .route("/payments", post(create_payment_handler))
}

/// Staff routes, mounted under `/admin`.
///
/// - `POST   /cars`                         - Create a car
/// - `PATCH  /cars/{id}`                    - Update a car
/// - `DELETE /cars/{id}`                    - Delete a car
/// - `POST   /cars/{id}/images`             - Attach an image
/// - `DELETE /cars/{id}/images/{image_id}`  - Remove an image
/// - `GET    /rentals`                      - All rentals (filterable)
/// - `PATCH  /rentals/{id}/status`          - Change rental status
/// - `GET    /payments`                     - All payments (filterable)
/// - `POST   /payments/{id}/mark-paid`      - Record cash collection
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/cars", post(create_car_handler))
        .route(
            "/cars/{id}",
            patch(update_car_handler).delete(delete_car_handler),
        )
        .route("/cars/{id}/images", post(add_car_image_handler))
        .route(
            "/cars/{id}/images/{image_id}",
            delete(delete_car_image_handler),
        )
        .route("/rentals", get(admin_rental_list_handler))
        .route("/rentals/{id}/status", patch(update_rental_status_handler))
        .route("/payments", get(admin_payment_list_handler))
        .route("/payments/{id}/mark-paid", post(mark_payment_paid_handler))
}

/// The full `/api` router with authentication but no rate limiting.
pub fn api_router(state: &AppState) -> Router<AppState> {
    build(state, None)
}

/// The full `/api` router with per-IP rate limiting.
///
/// `behind_proxy` selects header-based client IP extraction; enable it only
/// behind a trusted reverse proxy.
pub fn rate_limited_api_router(state: &AppState, behind_proxy: bool) -> Router<AppState> {
    build(state, Some(behind_proxy))
}

fn build(state: &AppState, limiting: Option<bool>) -> Router<AppState> {
    let limit = |router: Router<AppState>, tier: Tier| match limiting {
        Some(behind_proxy) => rate_limit::apply(router, tier, behind_proxy),
        None => router,
    };

    let admin = admin_routes().route_layer(middleware::from_fn(auth::require_staff));

    let protected = protected_routes()
        .nest("/admin", admin)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .merge(limit(token_routes(), Tier::Secure))
        .merge(limit(protected, Tier::General))
}
