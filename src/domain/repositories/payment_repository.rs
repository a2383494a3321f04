//! Repository trait for payment records.

use crate::domain::entities::{NewPayment, Payment, PaymentFilter};
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_rental(&self, rental_id: i64) -> Result<Option<Payment>, AppError>;

    /// Stores the payment and moves its rental from `pending` to `active`
    /// in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the rental already has a payment or
    /// is no longer pending.
    async fn create_and_activate(&self, new_payment: NewPayment) -> Result<Payment, AppError>;

    async fn list(&self, filter: PaymentFilter) -> Result<Vec<Payment>, AppError>;

    async fn count(&self, filter: PaymentFilter) -> Result<i64, AppError>;

    /// Marks a payment as collected now.
    ///
    /// Returns `Ok(None)` if the payment does not exist.
    async fn mark_paid(&self, id: i64) -> Result<Option<Payment>, AppError>;
}
