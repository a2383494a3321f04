//! Payment record entity.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Paypal,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Paypal => "paypal",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(format!("Unknown payment method: {other}")),
        }
    }
}

/// A payment attached to exactly one rental.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: i64,
    pub rental_id: i64,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Cash that has not been collected yet; due at vehicle pickup.
    pub fn is_cash_due(&self) -> bool {
        self.payment_method == PaymentMethod::Cash && !self.is_paid
    }
}

/// Input data for creating a payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub rental_id: i64,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Listing filter for payments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    pub offset: i64,
    pub limit: i64,
    pub is_paid: Option<bool>,
    pub payment_method: Option<PaymentMethod>,
    /// UTC day the payment was collected.
    pub paid_on: Option<NaiveDate>,
    /// Case-insensitive match on the renter's username or the car name.
    pub search: Option<String>,
}
