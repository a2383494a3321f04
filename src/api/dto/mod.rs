//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. Money amounts are serialized as decimal strings.

pub mod auth;
pub mod car;
pub mod health;
pub mod pagination;
pub mod payment;
pub mod rental;
