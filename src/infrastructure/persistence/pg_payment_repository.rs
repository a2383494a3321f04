//! PostgreSQL implementation of payment repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use super::contains_pattern;
use crate::domain::entities::{NewPayment, Payment, PaymentFilter, PaymentMethod};
use crate::domain::repositories::PaymentRepository;
use crate::error::AppError;

const PAYMENT_JOINS: &str = r#"
    JOIN rentals r ON r.id = p.rental_id
    JOIN users u ON u.id = r.user_id
    JOIN cars c ON c.id = r.car_id
"#;

const PAYMENT_FILTER: &str = r#"
    WHERE ($1::boolean IS NULL OR p.is_paid = $1)
      AND ($2::text IS NULL OR p.payment_method = $2)
      AND ($3::date IS NULL OR (p.paid_at AT TIME ZONE 'UTC')::date = $3)
      AND ($4::text IS NULL OR u.username ILIKE $4 OR c.name ILIKE $4)
"#;

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    rental_id: i64,
    amount: Decimal,
    payment_method: String,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(r: PaymentRow) -> Result<Self, Self::Error> {
        let payment_method = r
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|e| AppError::internal(e, json!({ "payment_id": r.id })))?;

        Ok(Payment {
            id: r.id,
            rental_id: r.rental_id,
            amount: r.amount,
            payment_method,
            is_paid: r.is_paid,
            paid_at: r.paid_at,
        })
    }
}

/// PostgreSQL repository for payments.
pub struct PgPaymentRepository {
    pool: Arc<PgPool>,
}

impl PgPaymentRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Loads the payment of a rental, shared with the rental repository.
pub(crate) async fn payment_for_rental(
    pool: &PgPool,
    rental_id: i64,
) -> Result<Option<Payment>, AppError> {
    let row = sqlx::query_as::<_, PaymentRow>(
        r#"
        SELECT id, rental_id, amount, payment_method, is_paid, paid_at
        FROM payments
        WHERE rental_id = $1
        "#,
    )
    .bind(rental_id)
    .fetch_optional(pool)
    .await?;

    row.map(Payment::try_from).transpose()
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn find_by_rental(&self, rental_id: i64) -> Result<Option<Payment>, AppError> {
        payment_for_rental(self.pool.as_ref(), rental_id).await
    }

    async fn create_and_activate(&self, new_payment: NewPayment) -> Result<Payment, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            INSERT INTO payments (rental_id, amount, payment_method, is_paid, paid_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, rental_id, amount, payment_method, is_paid, paid_at
            "#,
        )
        .bind(new_payment.rental_id)
        .bind(new_payment.amount)
        .bind(new_payment.payment_method.as_str())
        .bind(new_payment.is_paid)
        .bind(new_payment.paid_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => AppError::conflict(
                "Payment already exists",
                json!({ "rental_id": new_payment.rental_id }),
            ),
            other => other,
        })?;

        let activated = sqlx::query(
            r#"
            UPDATE rentals
            SET status = 'active', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(new_payment.rental_id)
        .execute(&mut *tx)
        .await?;

        // Dropping the transaction rolls back the inserted payment.
        if activated.rows_affected() == 0 {
            return Err(AppError::conflict(
                "Rental is not pending",
                json!({ "rental_id": new_payment.rental_id }),
            ));
        }

        tx.commit().await?;

        row.try_into()
    }

    async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, AppError> {
        let sql = format!(
            r#"
            SELECT p.id, p.rental_id, p.amount, p.payment_method, p.is_paid, p.paid_at
            FROM payments p {PAYMENT_JOINS}
            {PAYMENT_FILTER}
            ORDER BY p.id DESC
            LIMIT $5 OFFSET $6
            "#
        );
        let search = filter.search.as_deref().map(contains_pattern);

        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(filter.is_paid)
            .bind(filter.payment_method.map(|m| m.as_str()))
            .bind(filter.paid_on)
            .bind(&search)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn count(&self, filter: PaymentFilter) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM payments p {PAYMENT_JOINS} {PAYMENT_FILTER}");
        let search = filter.search.as_deref().map(contains_pattern);

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.is_paid)
            .bind(filter.payment_method.map(|m| m.as_str()))
            .bind(filter.paid_on)
            .bind(&search)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn mark_paid(&self, id: i64) -> Result<Option<Payment>, AppError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            UPDATE payments
            SET is_paid = TRUE,
                paid_at = COALESCE(paid_at, NOW())
            WHERE id = $1
            RETURNING id, rental_id, amount, payment_method, is_paid, paid_at
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Payment::try_from).transpose()
    }
}
