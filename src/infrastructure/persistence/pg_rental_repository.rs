//! PostgreSQL implementation of rental repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::contains_pattern;
use super::pg_car_repository::load_images;
use super::pg_payment_repository::payment_for_rental;
use crate::domain::entities::{
    Car, CarImage, NewRental, Rental, RentalDetails, RentalFilter, RentalStatus,
};
use crate::domain::repositories::RentalRepository;
use crate::error::AppError;

/// Rental columns joined with the owner and the booked car.
///
/// Expects the rentals relation to be aliased `r`.
const RENTAL_COLUMNS: &str = r#"
    r.id, r.user_id, u.username, r.start_date, r.end_date, r.total_price, r.status,
    r.created_at, r.updated_at,
    c.id AS car_id, c.name AS car_name, c.brand AS car_brand,
    c.model_year AS car_model_year, c.car_type AS car_car_type,
    c.transmission AS car_transmission, c.fuel_type AS car_fuel_type,
    c.seats AS car_seats, c.price_per_day AS car_price_per_day,
    c.is_available AS car_is_available, c.created_at AS car_created_at
"#;

const RENTAL_JOINS: &str = r#"
    JOIN users u ON u.id = r.user_id
    JOIN cars c ON c.id = r.car_id
"#;

const RENTAL_FILTER: &str = r#"
    WHERE ($1::bigint IS NULL OR r.user_id = $1)
      AND ($2::text IS NULL OR r.status = $2)
      AND ($3::text IS NULL OR u.username ILIKE $3 OR c.name ILIKE $3 OR c.brand ILIKE $3)
      AND ($4::date IS NULL OR r.start_date >= $4)
      AND ($5::date IS NULL OR r.end_date <= $5)
"#;

#[derive(sqlx::FromRow)]
struct RentalRow {
    id: i64,
    user_id: i64,
    username: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    car_id: i64,
    car_name: String,
    car_brand: String,
    car_model_year: i32,
    car_car_type: String,
    car_transmission: String,
    car_fuel_type: String,
    car_seats: i16,
    car_price_per_day: Decimal,
    car_is_available: bool,
    car_created_at: DateTime<Utc>,
}

impl RentalRow {
    fn into_rental(self, images: Vec<CarImage>) -> Result<Rental, AppError> {
        let status = self
            .status
            .parse::<RentalStatus>()
            .map_err(|e| AppError::internal(e, json!({ "rental_id": self.id })))?;

        Ok(Rental {
            id: self.id,
            user_id: self.user_id,
            username: self.username,
            car: Car {
                id: self.car_id,
                name: self.car_name,
                brand: self.car_brand,
                model_year: self.car_model_year,
                car_type: self.car_car_type,
                transmission: self.car_transmission,
                fuel_type: self.car_fuel_type,
                seats: self.car_seats,
                price_per_day: self.car_price_per_day,
                is_available: self.car_is_available,
                created_at: self.car_created_at,
                images,
            },
            start_date: self.start_date,
            end_date: self.end_date,
            total_price: self.total_price,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// PostgreSQL repository for rentals.
pub struct PgRentalRepository {
    pool: Arc<PgPool>,
}

impl PgRentalRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, rows: Vec<RentalRow>) -> Result<Vec<Rental>, AppError> {
        let mut car_ids: Vec<i64> = rows.iter().map(|r| r.car_id).collect();
        car_ids.sort_unstable();
        car_ids.dedup();

        let images = load_images(self.pool.as_ref(), &car_ids).await?;

        rows.into_iter()
            .map(|row| {
                let car_images = images.get(&row.car_id).cloned().unwrap_or_default();
                row.into_rental(car_images)
            })
            .collect()
    }

    async fn hydrate_one(&self, row: Option<RentalRow>) -> Result<Option<Rental>, AppError> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RentalRepository for PgRentalRepository {
    async fn create(&self, new_rental: NewRental) -> Result<Rental, AppError> {
        let sql = format!(
            r#"
            WITH r AS (
                INSERT INTO rentals (user_id, car_id, start_date, end_date, total_price, status)
                VALUES ($1, $2, $3, $4, $5, 'pending')
                RETURNING *
            )
            SELECT {RENTAL_COLUMNS} FROM r {RENTAL_JOINS}
            "#
        );

        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(new_rental.user_id)
            .bind(new_rental.car_id)
            .bind(new_rental.start_date)
            .bind(new_rental.end_date)
            .bind(new_rental.total_price)
            .fetch_one(self.pool.as_ref())
            .await?;

        self.hydrate_one(Some(row))
            .await?
            .ok_or_else(|| AppError::internal("Inserted rental vanished", json!({})))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Rental>, AppError> {
        let sql = format!("SELECT {RENTAL_COLUMNS} FROM rentals r {RENTAL_JOINS} WHERE r.id = $1");

        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        self.hydrate_one(row).await
    }

    async fn list(&self, filter: RentalFilter) -> Result<Vec<Rental>, AppError> {
        let sql = format!(
            r#"
            SELECT {RENTAL_COLUMNS} FROM rentals r {RENTAL_JOINS}
            {RENTAL_FILTER}
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $6 OFFSET $7
            "#
        );
        let search = filter.search.as_deref().map(contains_pattern);

        let rows = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(filter.user_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(&search)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        self.hydrate(rows).await
    }

    async fn count(&self, filter: RentalFilter) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM rentals r {RENTAL_JOINS} {RENTAL_FILTER}");
        let search = filter.search.as_deref().map(contains_pattern);

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.user_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(&search)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn has_overlap(
        &self,
        car_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, AppError> {
        let blocking: Vec<&str> = RentalStatus::blocking().iter().map(|s| s.as_str()).collect();

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM rentals
                WHERE car_id = $1
                  AND status = ANY($2)
                  AND start_date <= $4
                  AND end_date >= $3
            )
            "#,
        )
        .bind(car_id)
        .bind(&blocking)
        .bind(start)
        .bind(end)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn transition_status(
        &self,
        id: i64,
        from: RentalStatus,
        to: RentalStatus,
    ) -> Result<Option<Rental>, AppError> {
        let sql = format!(
            r#"
            WITH r AS (
                UPDATE rentals
                SET status = $3, updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING *
            )
            SELECT {RENTAL_COLUMNS} FROM r {RENTAL_JOINS}
            "#
        );

        let row = sqlx::query_as::<_, RentalRow>(&sql)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;

        self.hydrate_one(row).await
    }

    async fn find_details(&self, id: i64) -> Result<Option<RentalDetails>, AppError> {
        let Some(rental) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let email = sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE id = $1")
            .bind(rental.user_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        let payment = payment_for_rental(self.pool.as_ref(), rental.id).await?;

        Ok(Some(RentalDetails {
            rental,
            email,
            payment,
        }))
    }
}
