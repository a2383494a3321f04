//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; PostgreSQL implementations
//! live in `crate::infrastructure::persistence`. Mock implementations are
//! generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`UserRepository`] - Accounts and credentials
//! - [`CarRepository`] - Car inventory and images
//! - [`RentalRepository`] - Bookings, overlap checks and status transitions
//! - [`PaymentRepository`] - Payment records

pub mod car_repository;
pub mod payment_repository;
pub mod rental_repository;
pub mod user_repository;

pub use car_repository::CarRepository;
pub use payment_repository::PaymentRepository;
pub use rental_repository::RentalRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use car_repository::MockCarRepository;
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
#[cfg(test)]
pub use rental_repository::MockRentalRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
