//! Rental booking, cancellation and status management.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::email_job::{EmailJob, EmailQueue};
use crate::domain::entities::rental::total_price;
use crate::domain::entities::{NewRental, Rental, RentalFilter, RentalStatus};
use crate::domain::repositories::{CarRepository, RentalRepository};
use crate::error::AppError;

/// Service for creating and managing rentals.
///
/// Status changes that customers care about enqueue an [`EmailJob`];
/// enqueueing never fails the request.
pub struct RentalService<R: RentalRepository, C: CarRepository> {
    rentals: Arc<R>,
    cars: Arc<C>,
    emails: EmailQueue,
}

impl<R: RentalRepository, C: CarRepository> RentalService<R, C> {
    pub fn new(rentals: Arc<R>, cars: Arc<C>, emails: EmailQueue) -> Self {
        Self {
            rentals,
            cars,
            emails,
        }
    }

    /// Lists one page of rentals together with the total number of matches.
    pub async fn list(&self, filter: RentalFilter) -> Result<(Vec<Rental>, i64), AppError> {
        let (rentals, total) = tokio::try_join!(
            self.rentals.list(filter.clone()),
            self.rentals.count(filter)
        )?;
        Ok((rentals, total))
    }

    /// Loads a rental owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the rental does not exist or belongs
    /// to someone else.
    pub async fn get_for_user(&self, id: i64, user_id: i64) -> Result<Rental, AppError> {
        self.rentals
            .find_by_id(id)
            .await?
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| rental_not_found(id))
    }

    /// Books a car for an inclusive date range.
    ///
    /// The total price is `price_per_day * days`, counting both ends.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - `start_date` is after `end_date`
    /// - the car does not exist or is not available
    /// - a pending or active rental of the car overlaps the range
    pub async fn create(
        &self,
        user_id: i64,
        car_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Rental, AppError> {
        let car = self.cars.find_by_id(car_id).await?.ok_or_else(|| {
            let message = format!("Invalid pk \"{}\" - object does not exist.", car_id);
            AppError::bad_request(message.clone(), json!({ "car_id": [message] }))
        })?;

        if start_date > end_date {
            return Err(AppError::invalid("End date must be after start date"));
        }

        if !car.is_bookable() {
            return Err(AppError::invalid("This car is not available for rental"));
        }

        if self.rentals.has_overlap(car_id, start_date, end_date).await? {
            return Err(AppError::invalid(
                "This car is already booked for the selected dates",
            ));
        }

        let rental = self
            .rentals
            .create(NewRental {
                user_id,
                car_id,
                start_date,
                end_date,
                total_price: total_price(car.price_per_day, start_date, end_date),
            })
            .await?;

        tracing::info!(
            rental_id = rental.id,
            car_id,
            user_id,
            total = %rental.total_price,
            "Rental created"
        );

        Ok(rental)
    }

    /// Cancels a pending rental on behalf of its owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the caller does not own the rental and
    /// [`AppError::Validation`] if it is no longer pending.
    pub async fn cancel(&self, id: i64, user_id: i64) -> Result<Rental, AppError> {
        let rental = self.get_for_user(id, user_id).await?;

        if rental.status != RentalStatus::Pending {
            return Err(AppError::invalid("Only pending rentals can be cancelled"));
        }

        self.transition(rental, RentalStatus::Cancelled).await
    }

    /// Moves a rental to `next` on behalf of staff.
    ///
    /// Setting the current status again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the rental does not exist and
    /// [`AppError::Validation`] if the transition is not allowed.
    pub async fn set_status(&self, id: i64, next: RentalStatus) -> Result<Rental, AppError> {
        let rental = self
            .rentals
            .find_by_id(id)
            .await?
            .ok_or_else(|| rental_not_found(id))?;

        if rental.status == next {
            return Ok(rental);
        }

        if !rental.status.can_transition_to(next) {
            return Err(AppError::bad_request(
                format!("Cannot change rental status from {} to {}", rental.status, next),
                json!({ "status": [format!("Invalid transition from {}", rental.status)] }),
            ));
        }

        self.transition(rental, next).await
    }

    async fn transition(&self, rental: Rental, next: RentalStatus) -> Result<Rental, AppError> {
        let current = rental.status;
        let updated = self
            .rentals
            .transition_status(rental.id, current, next)
            .await?
            .ok_or_else(|| {
                AppError::conflict(
                    "Rental status changed concurrently",
                    json!({ "rental_id": rental.id, "expected": current.as_str() }),
                )
            })?;

        tracing::info!(
            rental_id = updated.id,
            from = %current,
            to = %next,
            "Rental status changed"
        );

        let job = match next {
            RentalStatus::Completed => Some(EmailJob::RentalCompleted { rental_id: updated.id }),
            RentalStatus::Cancelled => Some(EmailJob::RentalCancelled { rental_id: updated.id }),
            RentalStatus::Pending | RentalStatus::Active => None,
        };
        if let Some(job) = job {
            self.emails.enqueue(job);
        }

        Ok(updated)
    }
}

fn rental_not_found(id: i64) -> AppError {
    AppError::not_found("Rental not found", json!({ "rental_id": id }))
}
