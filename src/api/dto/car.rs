//! DTOs for the car catalogue and car administration.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};
use validator::{Validate, ValidationError};

use super::pagination::{PageRequest, PaginationParams};
use crate::domain::entities::{Car, CarFilter, CarImage, CarPatch, NewCar};

/// Cache namespace of car list pages. Invalidated on any car mutation.
pub const CAR_LIST_CACHE_PREFIX: &str = "cars:list:";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarImageResponse {
    pub id: i64,
    pub image: Option<String>,
}

impl From<CarImage> for CarImageResponse {
    fn from(img: CarImage) -> Self {
        Self {
            id: img.id,
            image: img.image,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarResponse {
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
    pub images: Vec<CarImageResponse>,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            id: car.id,
            name: car.name,
            brand: car.brand,
            model_year: car.model_year,
            car_type: car.car_type,
            transmission: car.transmission,
            fuel_type: car.fuel_type,
            seats: car.seats,
            price_per_day: car.price_per_day,
            is_available: car.is_available,
            created_at: car.created_at,
            images: car.images.into_iter().map(CarImageResponse::from).collect(),
        }
    }
}

/// Query parameters for `GET /api/cars`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct CarListQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    pub brand: Option<String>,
    pub car_type: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub is_available: Option<bool>,

    pub search: Option<String>,
}

impl CarListQuery {
    /// Builds the repository filter. Blank values are ignored.
    pub fn to_filter(&self, page: &PageRequest) -> CarFilter {
        CarFilter {
            offset: page.offset(),
            limit: page.limit(),
            brand: non_blank(&self.brand),
            car_type: non_blank(&self.car_type),
            transmission: non_blank(&self.transmission),
            fuel_type: non_blank(&self.fuel_type),
            is_available: self.is_available,
            search: non_blank(&self.search),
        }
    }

    /// Cache key covering every parameter that affects the response.
    ///
    /// The normalised filter is rendered as a JSON object, so values are
    /// quoted and cannot bleed into neighbouring fields.
    pub fn cache_key(&self, page: &PageRequest) -> String {
        let filter = self.to_filter(page);
        let params = json!({
            "page": page.page,
            "page_size": page.page_size,
            "brand": filter.brand,
            "car_type": filter.car_type,
            "transmission": filter.transmission,
            "fuel_type": filter.fuel_type,
            "is_available": filter.is_available,
            "search": filter.search,
        });
        format!("{}{}", CAR_LIST_CACHE_PREFIX, params)
    }
}

pub(super) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accepts positive prices that fit `NUMERIC(8, 2)`.
fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(ValidationError::new("price_not_positive")
            .with_message("Ensure this value is greater than 0.".into()));
    }
    if price.scale() > 2 {
        return Err(ValidationError::new("price_scale")
            .with_message("Ensure that there are no more than 2 decimal places.".into()));
    }
    if *price >= Decimal::new(1_000_000, 0) {
        return Err(ValidationError::new("price_digits")
            .with_message("Ensure that there are no more than 8 digits in total.".into()));
    }
    Ok(())
}

/// Request body for `POST /api/admin/cars`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 50))]
    pub brand: String,

    #[validate(range(min = 1900, max = 2100, message = "Enter a valid model year."))]
    pub model_year: i32,

    #[validate(length(min = 1, max = 50))]
    pub car_type: String,

    #[validate(length(min = 1, max = 20))]
    pub transmission: String,

    #[validate(length(min = 1, max = 20))]
    pub fuel_type: String,

    #[validate(range(min = 1, max = 100))]
    pub seats: i16,

    #[validate(custom(function = "validate_price"))]
    pub price_per_day: Decimal,

    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl From<CreateCarRequest> for NewCar {
    fn from(r: CreateCarRequest) -> Self {
        NewCar {
            name: r.name,
            brand: r.brand,
            model_year: r.model_year,
            car_type: r.car_type,
            transmission: r.transmission,
            fuel_type: r.fuel_type,
            seats: r.seats,
            price_per_day: r.price_per_day,
            is_available: r.is_available,
        }
    }
}

/// Request body for `PATCH /api/admin/cars/{id}`. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCarRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub brand: Option<String>,

    #[validate(range(min = 1900, max = 2100, message = "Enter a valid model year."))]
    pub model_year: Option<i32>,

    #[validate(length(min = 1, max = 50))]
    pub car_type: Option<String>,

    #[validate(length(min = 1, max = 20))]
    pub transmission: Option<String>,

    #[validate(length(min = 1, max = 20))]
    pub fuel_type: Option<String>,

    #[validate(range(min = 1, max = 100))]
    pub seats: Option<i16>,

    #[validate(custom(function = "validate_price"))]
    pub price_per_day: Option<Decimal>,

    pub is_available: Option<bool>,
}

impl From<UpdateCarRequest> for CarPatch {
    fn from(r: UpdateCarRequest) -> Self {
        CarPatch {
            name: r.name,
            brand: r.brand,
            model_year: r.model_year,
            car_type: r.car_type,
            transmission: r.transmission,
            fuel_type: r.fuel_type,
            seats: r.seats,
            price_per_day: r.price_per_day,
            is_available: r.is_available,
        }
    }
}

/// Request body for `POST /api/admin/cars/{id}/images`.
///
/// `image` is a stored file path or URL; it may be null.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCarImageRequest {
    #[validate(length(min = 1, max = 255))]
    pub image: Option<String>,
}
