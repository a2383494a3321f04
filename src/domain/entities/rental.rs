//! Rental booking entity, its status machine and pricing rule.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use super::car::Car;
use super::payment::Payment;

/// Lifecycle status of a rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RentalStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses that block the car for overlapping dates.
    pub fn blocking() -> [RentalStatus; 2] {
        [RentalStatus::Pending, RentalStatus::Active]
    }

    /// Returns true if a rental may move from `self` to `next`.
    ///
    /// Completed and cancelled are terminal.
    pub fn can_transition_to(&self, next: RentalStatus) -> bool {
        matches!(
            (self, next),
            (RentalStatus::Pending, RentalStatus::Active)
                | (RentalStatus::Pending, RentalStatus::Cancelled)
                | (RentalStatus::Active, RentalStatus::Completed)
                | (RentalStatus::Active, RentalStatus::Cancelled)
        )
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RentalStatus::Pending),
            "active" => Ok(RentalStatus::Active),
            "completed" => Ok(RentalStatus::Completed),
            "cancelled" => Ok(RentalStatus::Cancelled),
            other => Err(format!("Unknown rental status: {other}")),
        }
    }
}

/// A booking of a car by a user for an inclusive date range.
#[derive(Debug, Clone)]
pub struct Rental {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub car: Car,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: RentalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rental {
    /// Number of billable days, counting both the start and end date.
    pub fn days(&self) -> i64 {
        inclusive_days(self.start_date, self.end_date)
    }
}

/// Inclusive day count between two dates.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Total rental price: daily rate times the inclusive day count.
pub fn total_price(price_per_day: Decimal, start: NaiveDate, end: NaiveDate) -> Decimal {
    price_per_day * Decimal::from(inclusive_days(start, end))
}

/// Input data for creating a rental. The price is computed by the service.
#[derive(Debug, Clone)]
pub struct NewRental {
    pub user_id: i64,
    pub car_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
}

/// Listing filter for rentals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RentalFilter {
    pub offset: i64,
    pub limit: i64,
    /// Restrict to one user's rentals.
    pub user_id: Option<i64>,
    pub status: Option<RentalStatus>,
    /// Case-insensitive match on username, car name or brand.
    pub search: Option<String>,
    /// Rentals starting on or after this date.
    pub start_date: Option<NaiveDate>,
    /// Rentals ending on or before this date.
    pub end_date: Option<NaiveDate>,
}

impl RentalFilter {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            ..Default::default()
        }
    }

    pub fn for_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Everything the email templates need about a rental.
#[derive(Debug, Clone)]
pub struct RentalDetails {
    pub rental: Rental,
    pub email: String,
    pub payment: Option<Payment>,
}
