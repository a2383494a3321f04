//! Domain layer containing business entities and rules.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`email_job`] - Transactional email job model
//! - [`email_worker`] - Asynchronous email delivery worker
//!
//! # Booking Lifecycle
//!
//! 1. A user books a car, creating a `pending` [`entities::Rental`]
//! 2. Creating a [`entities::Payment`] moves the rental to `active`
//! 3. Staff complete or cancel the rental
//! 4. Each transition enqueues an [`email_job::EmailJob`] processed by
//!    [`email_worker::run_email_worker`]

pub mod email_job;
pub mod email_worker;
pub mod entities;
pub mod repositories;
