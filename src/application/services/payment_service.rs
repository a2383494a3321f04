//! Payment recording and collection.

use std::sync::Arc;

use serde_json::json;

use crate::domain::email_job::{EmailJob, EmailQueue};
use crate::domain::entities::{NewPayment, Payment, PaymentFilter, PaymentMethod, RentalStatus};
use crate::domain::repositories::{PaymentRepository, RentalRepository};
use crate::error::AppError;

/// Service for paying for rentals.
///
/// Only cash is accepted: the payment is recorded unpaid and collected at
/// pickup, when staff mark it paid.
pub struct PaymentService<P: PaymentRepository, R: RentalRepository> {
    payments: Arc<P>,
    rentals: Arc<R>,
    emails: EmailQueue,
}

impl<P: PaymentRepository, R: RentalRepository> PaymentService<P, R> {
    pub fn new(payments: Arc<P>, rentals: Arc<R>, emails: EmailQueue) -> Self {
        Self {
            payments,
            rentals,
            emails,
        }
    }

    /// Records a payment for the caller's rental and activates the rental.
    ///
    /// The amount is the rental's total price. A confirmation email is
    /// queued on success.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - the rental does not exist or belongs to another user
    /// - the rental already has a payment or is not pending
    /// - the method is not cash
    pub async fn create(
        &self,
        user_id: i64,
        rental_id: i64,
        method: PaymentMethod,
    ) -> Result<Payment, AppError> {
        let rental = self.rentals.find_by_id(rental_id).await?.ok_or_else(|| {
            let message = format!("Invalid pk \"{}\" - object does not exist.", rental_id);
            AppError::bad_request(message.clone(), json!({ "rental_id": [message] }))
        })?;

        if rental.user_id != user_id {
            return Err(AppError::invalid("Not your rental"));
        }

        if self.payments.find_by_rental(rental_id).await?.is_some() {
            return Err(AppError::invalid("Payment already exists"));
        }

        if rental.status != RentalStatus::Pending {
            return Err(AppError::invalid("Only pending rentals can be paid"));
        }

        if method != PaymentMethod::Cash {
            return Err(AppError::invalid("Only cash payment is supported currently"));
        }

        let payment = self
            .payments
            .create_and_activate(NewPayment {
                rental_id,
                amount: rental.total_price,
                payment_method: method,
                is_paid: false,
                paid_at: None,
            })
            .await?;

        tracing::info!(
            payment_id = payment.id,
            rental_id,
            amount = %payment.amount,
            method = %payment.payment_method,
            "Payment recorded, rental activated"
        );

        self.emails.enqueue(EmailJob::RentalConfirmed { rental_id });

        Ok(payment)
    }

    /// Lists one page of payments together with the total number of matches.
    pub async fn list(&self, filter: PaymentFilter) -> Result<(Vec<Payment>, i64), AppError> {
        let (payments, total) = tokio::try_join!(
            self.payments.list(filter.clone()),
            self.payments.count(filter)
        )?;
        Ok((payments, total))
    }

    /// Marks a payment as collected. Already paid payments keep their
    /// original `paid_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the payment does not exist.
    pub async fn mark_paid(&self, id: i64) -> Result<Payment, AppError> {
        let payment = self
            .payments
            .mark_paid(id)
            .await?
            .ok_or_else(|| AppError::not_found("Payment not found", json!({ "payment_id": id })))?;

        tracing::info!(payment_id = id, paid_at = ?payment.paid_at, "Payment marked as paid");

        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Car, Rental};
    use crate::domain::repositories::{MockPaymentRepository, MockRentalRepository};
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use tokio::sync::mpsc;

    fn rental(id: i64, user_id: i64, status: RentalStatus) -> Rental {
        let day = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        Rental {
            id,
            user_id,
            username: "dave".to_string(),
            car: Car {
                id: 2,
                name: "Clio".to_string(),
                brand: "Renault".to_string(),
                model_year: 2019,
                car_type: "Hatchback".to_string(),
                transmission: "Manual".to_string(),
                fuel_type: "Petrol".to_string(),
                seats: 5,
                price_per_day: Decimal::new(2500, 2),
                is_available: true,
                created_at: Utc::now(),
                images: vec![],
            },
            start_date: day,
            end_date: day,
            total_price: Decimal::new(2500, 2),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payment(id: i64, rental_id: i64, is_paid: bool) -> Payment {
        Payment {
            id,
            rental_id,
            amount: Decimal::new(2500, 2),
            payment_method: PaymentMethod::Cash,
            is_paid,
            paid_at: is_paid.then(Utc::now),
        }
    }

    fn service(
        payments: MockPaymentRepository,
        rentals: MockRentalRepository,
    ) -> (
        PaymentService<MockPaymentRepository, MockRentalRepository>,
        mpsc::Receiver<EmailJob>,
    ) {
        let (queue, rx) = EmailQueue::channel(8);
        (PaymentService::new(Arc::new(payments), Arc::new(rentals), queue), rx)
    }

    fn message(err: AppError) -> String {
        err.to_error_info().message
    }

    #[tokio::test]
    async fn test_cash_payment_activates_rental_and_queues_email() {
        let mut rentals = MockRentalRepository::new();
        rentals.expect_find_by_id()
            .returning(|id| Ok(Some(rental(id, 1, RentalStatus::Pending))));
        let mut payments = MockPaymentRepository::new();
        payments.expect_find_by_rental().returning(|_| Ok(None));
        payments.expect_create_and_activate()
            .withf(|p| {
                p.rental_id == 6
                    && p.amount == Decimal::new(2500, 2)
                    && !p.is_paid
                    && p.paid_at.is_none()
            })
            .times(1)
            .returning(|p| Ok(payment(1, p.rental_id, false)));

        let (svc, mut rx) = service(payments, rentals);
        let created = svc.create(1, 6, PaymentMethod::Cash).await.unwrap();

        assert!(!created.is_paid);
        assert_eq!(rx.try_recv().unwrap(), EmailJob::RentalConfirmed { rental_id: 6 });
    }

    #[tokio::test]
    async fn test_payment_for_someone_elses_rental() {
        let mut rentals = MockRentalRepository::new();
        rentals.expect_find_by_id()
            .returning(|id| Ok(Some(rental(id, 2, RentalStatus::Pending))));

        let (svc, _rx) = service(MockPaymentRepository::new(), rentals);
        let err = svc.create(1, 6, PaymentMethod::Cash).await.unwrap_err();

        assert_eq!(message(err), "Not your rental");
    }

    #[tokio::test]
    async fn test_duplicate_payment() {
        let mut rentals = MockRentalRepository::new();
        rentals.expect_find_by_id()
            .returning(|id| Ok(Some(rental(id, 1, RentalStatus::Active))));
        let mut payments = MockPaymentRepository::new();
        payments.expect_find_by_rental()
            .returning(|rental_id| Ok(Some(payment(3, rental_id, false))));
        payments.expect_create_and_activate().never();

        let (svc, _rx) = service(payments, rentals);
        let err = svc.create(1, 6, PaymentMethod::Cash).await.unwrap_err();

        assert_eq!(message(err), "Payment already exists");
    }

    #[tokio::test]
    async fn test_paypal_not_supported() {
        let mut rentals = MockRentalRepository::new();
        rentals.expect_find_by_id()
            .returning(|id| Ok(Some(rental(id, 1, RentalStatus::Pending))));
        let mut payments = MockPaymentRepository::new();
        payments.expect_find_by_rental().returning(|_| Ok(None));
        payments.expect_create_and_activate().never();

        let (svc, mut rx) = service(payments, rentals);
        let err = svc.create(1, 6, PaymentMethod::Paypal).await.unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(message(err), "Only cash payment is supported currently");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancelled_rental_cannot_be_paid() {
        let mut rentals = MockRentalRepository::new();
        rentals.expect_find_by_id()
            .returning(|id| Ok(Some(rental(id, 1, RentalStatus::Cancelled))));
        let mut payments = MockPaymentRepository::new();
        payments.expect_find_by_rental().returning(|_| Ok(None));

        let (svc, _rx) = service(payments, rentals);
        let err = svc.create(1, 6, PaymentMethod::Cash).await.unwrap_err();

        assert_eq!(message(err), "Only pending rentals can be paid");
    }

    #[tokio::test]
    async fn test_unknown_rental() {
        let mut rentals = MockRentalRepository::new();
        rentals.expect_find_by_id().returning(|_| Ok(None));

        let (svc, _rx) = service(MockPaymentRepository::new(), rentals);
        let err = svc.create(1, 404, PaymentMethod::Cash).await.unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_mark_paid() {
        let mut payments = MockPaymentRepository::new();
        payments.expect_mark_paid()
            .withf(|id| *id == 3)
            .returning(|id| Ok(Some(payment(id, 6, true))));

        let (svc, _rx) = service(payments, MockRentalRepository::new());
        let paid = svc.mark_paid(3).await.unwrap();

        assert!(paid.is_paid);
        assert!(paid.paid_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_paid_missing_payment() {
        let mut payments = MockPaymentRepository::new();
        payments.expect_mark_paid().returning(|_| Ok(None));

        let (svc, _rx) = service(payments, MockRentalRepository::new());

        assert!(matches!(
            svc.mark_paid(3).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
