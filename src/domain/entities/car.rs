//! Car inventory entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// An image attached to a car. The image itself lives in external storage.
#[derive(Debug, Clone, PartialEq)]
pub struct CarImage {
    pub id: i64,
    pub car_id: i64,
    pub image: Option<String>,
}

/// A rentable car with pricing and availability.
#[derive(Debug, Clone)]
pub struct Car {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub model_year: i32,
    pub car_type: String,
    pub transmission: String,
    pub fuel_type: String,
    pub seats: i16,
    pub price_per_day: Decimal,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub images: Vec<CarImage>,
}

impl Car {
    /// Human-readable title, e.g. `"Toyota Corolla (2022)"`.
    pub fn title(&self) -> String {
        format!("{} {} ({})", self.brand, self.name, self.model_year)
    }

    /// Returns true if the car can be offered for new bookings.
    ///
    /// Overlapping rentals are checked separately at booking time.
    pub fn is_bookable(&self) -> bool {
        self.is_available
    }
}

/// Input data for creating a car.
#[derive(Debug, Clone)]
pub struct NewCar {
    pub name: String,
    pub brand: String,
    pub model_year: i32,
    pub car_type: String,
    pub transmission: String,
    pub fuel_type: String,
    pub seats: i16,
    pub price_per_day: Decimal,
    pub is_available: bool,
}

/// Partial update for a car. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct CarPatch {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub model_year: Option<i32>,
    pub car_type: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub seats: Option<i16>,
    pub price_per_day: Option<Decimal>,
    pub is_available: Option<bool>,
}

impl CarPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.model_year.is_none()
            && self.car_type.is_none()
            && self.transmission.is_none()
            && self.fuel_type.is_none()
            && self.seats.is_none()
            && self.price_per_day.is_none()
            && self.is_available.is_none()
    }
}

/// Listing filter for the car catalogue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarFilter {
    pub offset: i64,
    pub limit: i64,
    pub brand: Option<String>,
    pub car_type: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub is_available: Option<bool>,
    /// Case-insensitive substring match on name or brand.
    pub search: Option<String>,
}

impl CarFilter {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_car() -> Car {
        Car {
            id: 1,
            name: "Corolla".to_string(),
            brand: "Toyota".to_string(),
            model_year: 2022,
            car_type: "Sedan".to_string(),
            transmission: "Automatic".to_string(),
            fuel_type: "Petrol".to_string(),
            seats: 5,
            price_per_day: Decimal::new(4500, 2),
            is_available: true,
            created_at: Utc::now(),
            images: vec![],
        }
    }

    #[test]
    fn test_car_title() {
        assert_eq!(sample_car().title(), "Toyota Corolla (2022)");
    }

    #[test]
    fn test_unavailable_car_is_not_bookable() {
        let mut car = sample_car();
        assert!(car.is_bookable());
        car.is_available = false;
        assert!(!car.is_bookable());
    }

    #[test]
    fn test_empty_patch() {
        assert!(CarPatch::default().is_empty());
        let patch = CarPatch {
            is_available: Some(false),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
