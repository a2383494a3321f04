//! Repository trait for rental bookings.

use crate::domain::entities::{NewRental, Rental, RentalDetails, RentalFilter, RentalStatus};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Repository interface for rentals.
///
/// Returned [`Rental`]s embed the booked car (with images) and the
/// owner's username.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRentalRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RentalRepository: Send + Sync {
    /// Inserts a rental in `pending` status.
    async fn create(&self, new_rental: NewRental) -> Result<Rental, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Rental>, AppError>;

    /// Lists rentals matching the filter, newest first.
    async fn list(&self, filter: RentalFilter) -> Result<Vec<Rental>, AppError>;

    /// Counts rentals matching the filter. Offset and limit are ignored.
    async fn count(&self, filter: RentalFilter) -> Result<i64, AppError>;

    /// Returns true if the car has a pending or active rental sharing at
    /// least one day with `start..=end`.
    async fn has_overlap(
        &self,
        car_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, AppError>;

    /// Moves a rental from `from` to `to`.
    ///
    /// Returns `Ok(None)` if the rental does not exist or is no longer in `from`.
    async fn transition_status(
        &self,
        id: i64,
        from: RentalStatus,
        to: RentalStatus,
    ) -> Result<Option<Rental>, AppError>;

    /// Loads a rental with the owner's email and its payment, if any.
    async fn find_details(&self, id: i64) -> Result<Option<RentalDetails>, AppError>;
}
