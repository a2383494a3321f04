//! Repository trait for car inventory.

use crate::domain::entities::{Car, CarFilter, CarImage, CarPatch, NewCar};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for cars and their images.
///
/// Every returned [`Car`] carries its images.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCarRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn create(&self, new_car: NewCar) -> Result<Car, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Car>, AppError>;

    /// Lists cars matching the filter, newest first.
    async fn list(&self, filter: CarFilter) -> Result<Vec<Car>, AppError>;

    /// Counts cars matching the filter. Offset and limit are ignored.
    async fn count(&self, filter: CarFilter) -> Result<i64, AppError>;

    /// Applies a partial update.
    ///
    /// Returns `Ok(None)` if the car does not exist.
    async fn update(&self, id: i64, patch: CarPatch) -> Result<Option<Car>, AppError>;

    /// Deletes a car together with its images and rentals.
    ///
    /// Returns `Ok(false)` if the car does not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Attaches an image to a car.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the car does not exist.
    async fn add_image(&self, car_id: i64, image: Option<String>) -> Result<CarImage, AppError>;

    /// Removes an image from a car. Returns `Ok(false)` if no such image.
    async fn delete_image(&self, car_id: i64, image_id: i64) -> Result<bool, AppError>;
}
