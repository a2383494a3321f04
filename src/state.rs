//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{AuthService, CarService, PaymentService, RentalService};
use crate::domain::email_job::EmailQueue;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::{
    PgCarRepository, PgPaymentRepository, PgRentalRepository, PgUserRepository,
};

pub type AppAuthService = AuthService<PgUserRepository>;
pub type AppCarService = CarService<PgCarRepository>;
pub type AppRentalService = RentalService<PgRentalRepository, PgCarRepository>;
pub type AppPaymentService = PaymentService<PgPaymentRepository, PgRentalRepository>;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    pub auth_service: Arc<AppAuthService>,
    pub car_service: Arc<AppCarService>,
    pub rental_service: Arc<AppRentalService>,
    pub payment_service: Arc<AppPaymentService>,
    pub cache: Arc<dyn CacheService>,
    /// TTL of cached car list pages.
    pub cache_ttl_seconds: u64,
    pub email_queue: EmailQueue,
}

/// Token lifetimes and signing secret for [`AppState::new`].
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
}

impl AppState {
    /// Wires Postgres repositories into the services.
    pub fn new(
        db: Arc<PgPool>,
        cache: Arc<dyn CacheService>,
        cache_ttl_seconds: u64,
        email_queue: EmailQueue,
        jwt: &JwtSettings,
    ) -> Self {
        let users = Arc::new(PgUserRepository::new(db.clone()));
        let cars = Arc::new(PgCarRepository::new(db.clone()));
        let rentals = Arc::new(PgRentalRepository::new(db.clone()));
        let payments = Arc::new(PgPaymentRepository::new(db.clone()));

        let auth_service = Arc::new(AuthService::new(
            users,
            &jwt.secret,
            jwt.access_ttl_seconds,
            jwt.refresh_ttl_seconds,
        ));
        let car_service = Arc::new(CarService::new(cars.clone()));
        let rental_service = Arc::new(RentalService::new(
            rentals.clone(),
            cars,
            email_queue.clone(),
        ));
        let payment_service = Arc::new(PaymentService::new(
            payments,
            rentals,
            email_queue.clone(),
        ));

        Self {
            db,
            auth_service,
            car_service,
            rental_service,
            payment_service,
            cache,
            cache_ttl_seconds,
            email_queue,
        }
    }
}
