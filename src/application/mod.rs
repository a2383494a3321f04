//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::auth_service::AuthService`] - Password login and JWT verification
//! - [`services::car_service::CarService`] - Car catalogue and inventory
//! - [`services::rental_service::RentalService`] - Booking rules and status changes
//! - [`services::payment_service::PaymentService`] - Cash payments and collection

pub mod services;
