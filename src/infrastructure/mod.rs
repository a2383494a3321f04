//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for persistence, caching and mail delivery.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`mail`] - Email transports and message templates
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod mail;
pub mod persistence;
