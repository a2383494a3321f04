//! Plain-text email templates for the booking lifecycle.

use askama::Template;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::mailer::EmailMessage;
use crate::domain::email_job::EmailJob;
use crate::domain::entities::RentalDetails;

#[derive(Template)]
#[template(path = "emails/rental_confirmed.txt")]
struct RentalConfirmedEmail<'a> {
    username: &'a str,
    rental_id: i64,
    car_title: &'a str,
    car_type: &'a str,
    transmission: &'a str,
    seats: i16,
    fuel_type: &'a str,
    days: i64,
    plural: &'static str,
    pickup: &'a str,
    dropoff: &'a str,
    total: Decimal,
    per_day: Decimal,
    cash_due: bool,
    pickup_location: &'a str,
    brand_name: &'a str,
}

#[derive(Template)]
#[template(path = "emails/rental_completed.txt")]
struct RentalCompletedEmail<'a> {
    username: &'a str,
    rental_id: i64,
    car_short: &'a str,
    car_title: &'a str,
    days: i64,
    plural: &'static str,
    pickup: &'a str,
    dropoff: &'a str,
    total: Decimal,
    brand_name: &'a str,
}

#[derive(Template)]
#[template(path = "emails/rental_cancelled.txt")]
struct RentalCancelledEmail<'a> {
    username: &'a str,
    rental_id: i64,
    car_title: &'a str,
    days: i64,
    plural: &'static str,
    pickup: &'a str,
    dropoff: &'a str,
    total: Decimal,
    cancelled_on: &'a str,
    brand_name: &'a str,
}

/// Renders [`EmailJob`]s into ready-to-send [`EmailMessage`]s.
#[derive(Debug, Clone)]
pub struct EmailComposer {
    from: String,
    brand_name: String,
    pickup_location: String,
}

impl EmailComposer {
    pub fn new(
        from: impl Into<String>,
        brand_name: impl Into<String>,
        pickup_location: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            brand_name: brand_name.into(),
            pickup_location: pickup_location.into(),
        }
    }

    /// Builds the message for a job.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn compose(
        &self,
        job: &EmailJob,
        details: &RentalDetails,
    ) -> Result<EmailMessage, askama::Error> {
        let rental = &details.rental;
        let car = &rental.car;
        let days = rental.days();
        let plural = if days > 1 { "s" } else { "" };
        let pickup = long_date(rental.start_date);
        let dropoff = long_date(rental.end_date);
        let car_title = car.title();

        let (subject, body) = match job {
            EmailJob::RentalConfirmed { .. } => {
                let cash_due = details
                    .payment
                    .as_ref()
                    .is_some_and(|payment| payment.is_cash_due());

                let body = RentalConfirmedEmail {
                    username: &rental.username,
                    rental_id: rental.id,
                    car_title: &car_title,
                    car_type: &car.car_type,
                    transmission: &car.transmission,
                    seats: car.seats,
                    fuel_type: &car.fuel_type,
                    days,
                    plural,
                    pickup: &pickup,
                    dropoff: &dropoff,
                    total: rental.total_price,
                    per_day: car.price_per_day,
                    cash_due,
                    pickup_location: &self.pickup_location,
                    brand_name: &self.brand_name,
                }
                .render()?;

                (format!("Rental Confirmed – Booking #{}", rental.id), body)
            }
            EmailJob::RentalCompleted { .. } => {
                let car_short = format!("{} {}", car.brand, car.name);
                let body = RentalCompletedEmail {
                    username: &rental.username,
                    rental_id: rental.id,
                    car_short: &car_short,
                    car_title: &car_title,
                    days,
                    plural,
                    pickup: &pickup,
                    dropoff: &dropoff,
                    total: rental.total_price,
                    brand_name: &self.brand_name,
                }
                .render()?;

                ("Rental Completed – Thank You!".to_string(), body)
            }
            EmailJob::RentalCancelled { .. } => {
                let cancelled_on = rental
                    .updated_at
                    .format("%B %d, %Y at %I:%M %p")
                    .to_string();
                let body = RentalCancelledEmail {
                    username: &rental.username,
                    rental_id: rental.id,
                    car_title: &car_title,
                    days,
                    plural,
                    pickup: &pickup,
                    dropoff: &dropoff,
                    total: rental.total_price,
                    cancelled_on: &cancelled_on,
                    brand_name: &self.brand_name,
                }
                .render()?;

                (format!("Rental Cancelled – Booking #{}", rental.id), body)
            }
        };

        Ok(EmailMessage {
            from: self.from.clone(),
            to: details.email.clone(),
            subject,
            body,
        })
    }
}

fn long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}
