//! Car catalogue and inventory management.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{Car, CarFilter, CarImage, CarPatch, NewCar};
use crate::domain::repositories::CarRepository;
use crate::error::AppError;

/// Service for browsing and managing cars.
pub struct CarService<C: CarRepository> {
    cars: Arc<C>,
}

impl<C: CarRepository> CarService<C> {
    pub fn new(cars: Arc<C>) -> Self {
        Self { cars }
    }

    /// Lists one page of cars together with the total number of matches.
    pub async fn list(&self, filter: CarFilter) -> Result<(Vec<Car>, i64), AppError> {
        let (cars, total) = tokio::try_join!(
            self.cars.list(filter.clone()),
            self.cars.count(filter)
        )?;
        Ok((cars, total))
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the car does not exist.
    pub async fn get(&self, id: i64) -> Result<Car, AppError> {
        self.cars
            .find_by_id(id)
            .await?
            .ok_or_else(|| car_not_found(id))
    }

    pub async fn create(&self, new_car: NewCar) -> Result<Car, AppError> {
        let car = self.cars.create(new_car).await?;
        tracing::info!(car_id = car.id, "Car created");
        Ok(car)
    }

    /// Applies a partial update. An empty patch returns the car unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the car does not exist.
    pub async fn update(&self, id: i64, patch: CarPatch) -> Result<Car, AppError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        self.cars
            .update(id, patch)
            .await?
            .ok_or_else(|| car_not_found(id))
    }

    /// Deletes a car. Its images, rentals and payments go with it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the car does not exist.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.cars.delete(id).await? {
            return Err(car_not_found(id));
        }

        tracing::info!(car_id = id, "Car deleted");
        Ok(())
    }

    /// Attaches an image reference to a car.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the car does not exist.
    pub async fn add_image(&self, car_id: i64, image: Option<String>) -> Result<CarImage, AppError> {
        self.get(car_id).await?;
        self.cars.add_image(car_id, image).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the image does not belong to the car.
    pub async fn delete_image(&self, car_id: i64, image_id: i64) -> Result<(), AppError> {
        if !self.cars.delete_image(car_id, image_id).await? {
            return Err(AppError::not_found(
                "Image not found",
                json!({ "car_id": car_id, "image_id": image_id }),
            ));
        }
        Ok(())
    }
}

fn car_not_found(id: i64) -> AppError {
    AppError::not_found("Car not found", json!({ "car_id": id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockCarRepository;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn car(id: i64) -> Car {
        Car {
            id,
            name: "Civic".to_string(),
            brand: "Honda".to_string(),
            model_year: 2020,
            car_type: "Sedan".to_string(),
            transmission: "Manual".to_string(),
            fuel_type: "Petrol".to_string(),
            seats: 5,
            price_per_day: Decimal::new(3500, 2),
            is_available: true,
            created_at: Utc::now(),
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_list_returns_page_and_total() {
        let mut repo = MockCarRepository::new();
        repo.expect_list()
            .withf(|f| f.offset == 10 && f.limit == 10 && f.brand.as_deref() == Some("Honda"))
            .times(1)
            .returning(|_| Ok(vec![car(11), car(12)]));
        repo.expect_count().times(1).returning(|_| Ok(12));

        let service = CarService::new(Arc::new(repo));
        let mut filter = CarFilter::new(10, 10);
        filter.brand = Some("Honda".to_string());

        let (cars, total) = service.list(filter).await.unwrap();

        assert_eq!(cars.len(), 2);
        assert_eq!(total, 12);
    }

    #[tokio::test]
    async fn test_get_missing_car() {
        let mut repo = MockCarRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = CarService::new(Arc::new(repo)).get(404).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_empty_patch_skips_update() {
        let mut repo = MockCarRepository::new();
        repo.expect_update().never();
        repo.expect_find_by_id().times(1).returning(|id| Ok(Some(car(id))));

        let updated = CarService::new(Arc::new(repo))
            .update(3, CarPatch::default())
            .await
            .unwrap();

        assert_eq!(updated.id, 3);
    }

    #[tokio::test]
    async fn test_update_missing_car() {
        let mut repo = MockCarRepository::new();
        repo.expect_update().returning(|_, _| Ok(None));

        let patch = CarPatch {
            is_available: Some(false),
            ..Default::default()
        };
        let result = CarService::new(Arc::new(repo)).update(9, patch).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_car() {
        let mut repo = MockCarRepository::new();
        repo.expect_delete().withf(|id| *id == 1).returning(|_| Ok(false));

        let result = CarService::new(Arc::new(repo)).delete(1).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_add_image_requires_car() {
        let mut repo = MockCarRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_add_image().never();

        let result = CarService::new(Arc::new(repo))
            .add_image(5, Some("cars/front.jpg".to_string()))
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_image_not_found() {
        let mut repo = MockCarRepository::new();
        repo.expect_delete_image()
            .withf(|car_id, image_id| *car_id == 1 && *image_id == 2)
            .returning(|_, _| Ok(false));

        let result = CarService::new(Arc::new(repo)).delete_image(1, 2).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
