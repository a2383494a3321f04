//! DTOs for payments.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use super::car::non_blank;
use super::pagination::{PageRequest, PaginationParams};
use crate::domain::entities::{Payment, PaymentFilter, PaymentMethod};
use crate::error::AppError;

/// Request body for `POST /api/payments`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[validate(range(min = 1))]
    pub rental_id: i64,
    pub payment_method: String,
}

impl CreatePaymentRequest {
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the method is not a known choice.
    pub fn method(&self) -> Result<PaymentMethod, AppError> {
        parse_method(&self.payment_method)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: i64,
    pub rental: i64,
    pub amount: Decimal,
    pub payment_method: String,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            rental: p.rental_id,
            amount: p.amount,
            payment_method: p.payment_method.to_string(),
            is_paid: p.is_paid,
            paid_at: p.paid_at,
        }
    }
}

/// Query parameters for `GET /api/admin/payments`.
///
/// `paid_at` is a UTC date; `search` matches the renter's username or the
/// car name.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct AdminPaymentQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub is_paid: Option<bool>,

    pub payment_method: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub paid_at: Option<NaiveDate>,

    pub search: Option<String>,
}

impl AdminPaymentQuery {
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an unknown `payment_method`.
    pub fn to_filter(&self, page: &PageRequest) -> Result<PaymentFilter, AppError> {
        let payment_method = match self.payment_method.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_method(raw)?),
        };

        Ok(PaymentFilter {
            offset: page.offset(),
            limit: page.limit(),
            is_paid: self.is_paid,
            payment_method,
            paid_on: self.paid_at,
            search: non_blank(&self.search),
        })
    }
}

fn parse_method(raw: &str) -> Result<PaymentMethod, AppError> {
    raw.parse::<PaymentMethod>().map_err(|_| {
        let message = format!("\"{}\" is not a valid choice.", raw);
        AppError::bad_request(message.clone(), json!({ "payment_method": [message] }))
    })
}
