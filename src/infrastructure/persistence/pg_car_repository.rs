//! PostgreSQL implementation of car repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

use super::contains_pattern;
use crate::domain::entities::{Car, CarFilter, CarImage, CarPatch, NewCar};
use crate::domain::repositories::CarRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct CarRow {
    id: i64,
    name: String,
    brand: String,
    model_year: i32,
    car_type: String,
    transmission: String,
    fuel_type: String,
    seats: i16,
    price_per_day: Decimal,
    is_available: bool,
    created_at: DateTime<Utc>,
}

impl CarRow {
    fn into_car(self, images: Vec<CarImage>) -> Car {
        Car {
            id: self.id,
            name: self.name,
            brand: self.brand,
            model_year: self.model_year,
            car_type: self.car_type,
            transmission: self.transmission,
            fuel_type: self.fuel_type,
            seats: self.seats,
            price_per_day: self.price_per_day,
            is_available: self.is_available,
            created_at: self.created_at,
            images,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CarImageRow {
    id: i64,
    car_id: i64,
    image: Option<String>,
}

impl From<CarImageRow> for CarImage {
    fn from(r: CarImageRow) -> Self {
        CarImage {
            id: r.id,
            car_id: r.car_id,
            image: r.image,
        }
    }
}

/// Loads images for a set of cars in one query, grouped by car id.
pub(crate) async fn load_images(
    pool: &PgPool,
    car_ids: &[i64],
) -> Result<HashMap<i64, Vec<CarImage>>, sqlx::Error> {
    if car_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, CarImageRow>(
        r#"
        SELECT id, car_id, image
        FROM car_images
        WHERE car_id = ANY($1)
        ORDER BY id
        "#,
    )
    .bind(car_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<i64, Vec<CarImage>> = HashMap::new();
    for row in rows {
        grouped.entry(row.car_id).or_default().push(row.into());
    }
    Ok(grouped)
}

/// PostgreSQL repository for cars and car images.
///
/// Images are fetched with a second batched query instead of a join so that
/// pagination applies to cars, not to car/image pairs.
pub struct PgCarRepository {
    pool: Arc<PgPool>,
}

impl PgCarRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn with_images(&self, rows: Vec<CarRow>) -> Result<Vec<Car>, AppError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut images = load_images(self.pool.as_ref(), &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let car_images = images.remove(&row.id).unwrap_or_default();
                row.into_car(car_images)
            })
            .collect())
    }

    async fn single_with_images(&self, row: Option<CarRow>) -> Result<Option<Car>, AppError> {
        match row {
            Some(row) => Ok(self.with_images(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CarRepository for PgCarRepository {
    async fn create(&self, new_car: NewCar) -> Result<Car, AppError> {
        let row = sqlx::query_as::<_, CarRow>(
            r#"
            INSERT INTO cars (name, brand, model_year, car_type, transmission, fuel_type,
                              seats, price_per_day, is_available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, brand, model_year, car_type, transmission, fuel_type,
                      seats, price_per_day, is_available, created_at
            "#,
        )
        .bind(&new_car.name)
        .bind(&new_car.brand)
        .bind(new_car.model_year)
        .bind(&new_car.car_type)
        .bind(&new_car.transmission)
        .bind(&new_car.fuel_type)
        .bind(new_car.seats)
        .bind(new_car.price_per_day)
        .bind(new_car.is_available)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into_car(Vec::new()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Car>, AppError> {
        let row = sqlx::query_as::<_, CarRow>(
            r#"
            SELECT id, name, brand, model_year, car_type, transmission, fuel_type,
                   seats, price_per_day, is_available, created_at
            FROM cars
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        self.single_with_images(row).await
    }

    async fn list(&self, filter: CarFilter) -> Result<Vec<Car>, AppError> {
        let search = filter.search.as_deref().map(contains_pattern);

        let rows = sqlx::query_as::<_, CarRow>(
            r#"
            SELECT id, name, brand, model_year, car_type, transmission, fuel_type,
                   seats, price_per_day, is_available, created_at
            FROM cars
            WHERE ($1::text IS NULL OR lower(brand) = lower($1))
              AND ($2::text IS NULL OR lower(car_type) = lower($2))
              AND ($3::text IS NULL OR lower(transmission) = lower($3))
              AND ($4::text IS NULL OR lower(fuel_type) = lower($4))
              AND ($5::boolean IS NULL OR is_available = $5)
              AND ($6::text IS NULL OR name ILIKE $6 OR brand ILIKE $6)
            ORDER BY created_at DESC, id DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(&filter.brand)
        .bind(&filter.car_type)
        .bind(&filter.transmission)
        .bind(&filter.fuel_type)
        .bind(filter.is_available)
        .bind(&search)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        self.with_images(rows).await
    }

    async fn count(&self, filter: CarFilter) -> Result<i64, AppError> {
        let search = filter.search.as_deref().map(contains_pattern);

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM cars
            WHERE ($1::text IS NULL OR lower(brand) = lower($1))
              AND ($2::text IS NULL OR lower(car_type) = lower($2))
              AND ($3::text IS NULL OR lower(transmission) = lower($3))
              AND ($4::text IS NULL OR lower(fuel_type) = lower($4))
              AND ($5::boolean IS NULL OR is_available = $5)
              AND ($6::text IS NULL OR name ILIKE $6 OR brand ILIKE $6)
            "#,
        )
        .bind(&filter.brand)
        .bind(&filter.car_type)
        .bind(&filter.transmission)
        .bind(&filter.fuel_type)
        .bind(filter.is_available)
        .bind(&search)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, patch: CarPatch) -> Result<Option<Car>, AppError> {
        let row = sqlx::query_as::<_, CarRow>(
            r#"
            UPDATE cars
            SET name          = COALESCE($2, name),
                brand         = COALESCE($3, brand),
                model_year    = COALESCE($4, model_year),
                car_type      = COALESCE($5, car_type),
                transmission  = COALESCE($6, transmission),
                fuel_type     = COALESCE($7, fuel_type),
                seats         = COALESCE($8, seats),
                price_per_day = COALESCE($9, price_per_day),
                is_available  = COALESCE($10, is_available)
            WHERE id = $1
            RETURNING id, name, brand, model_year, car_type, transmission, fuel_type,
                      seats, price_per_day, is_available, created_at
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.brand)
        .bind(patch.model_year)
        .bind(&patch.car_type)
        .bind(&patch.transmission)
        .bind(&patch.fuel_type)
        .bind(patch.seats)
        .bind(patch.price_per_day)
        .bind(patch.is_available)
        .fetch_optional(self.pool.as_ref())
        .await?;

        self.single_with_images(row).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_image(&self, car_id: i64, image: Option<String>) -> Result<CarImage, AppError> {
        let row = sqlx::query_as::<_, CarImageRow>(
            r#"
            INSERT INTO car_images (car_id, image)
            VALUES ($1, $2)
            RETURNING id, car_id, image
            "#,
        )
        .bind(car_id)
        .bind(&image)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn delete_image(&self, car_id: i64, image_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM car_images WHERE id = $1 AND car_id = $2")
            .bind(image_id)
            .bind(car_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
