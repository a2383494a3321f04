//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx prepared
//! statements mapped through `FromRow` row structs.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - Accounts
//! - [`PgCarRepository`] - Car inventory and images
//! - [`PgRentalRepository`] - Bookings
//! - [`PgPaymentRepository`] - Payment records

pub mod pg_car_repository;
pub mod pg_payment_repository;
pub mod pg_rental_repository;
pub mod pg_user_repository;

pub use pg_car_repository::PgCarRepository;
pub use pg_payment_repository::PgPaymentRepository;
pub use pg_rental_repository::PgRentalRepository;
pub use pg_user_repository::PgUserRepository;

/// Builds an `ILIKE` pattern matching `term` anywhere, escaping wildcards.
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
