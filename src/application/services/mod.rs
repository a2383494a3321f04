//! Business logic services for the application layer.

pub mod auth_service;
pub mod car_service;
pub mod payment_service;
pub mod rental_service;

pub use auth_service::{AuthService, AuthUser, TokenPair, hash_password};
pub use car_service::CarService;
pub use payment_service::PaymentService;
pub use rental_service::RentalService;
