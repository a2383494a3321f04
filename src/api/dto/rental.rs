//! DTOs for rental bookings.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use super::car::{CarResponse, non_blank};
use super::pagination::{PageRequest, PaginationParams};
use crate::domain::entities::{Rental, RentalFilter, RentalStatus};
use crate::error::AppError;

/// Request body for `POST /api/rentals`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRentalRequest {
    #[validate(range(min = 1))]
    pub car_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A rental with its car and the owner's username.
#[derive(Debug, Serialize, Deserialize)]
pub struct RentalResponse {
    pub id: i64,
    pub username: String,
    pub car: CarResponse,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Rental> for RentalResponse {
    fn from(r: Rental) -> Self {
        Self {
            id: r.id,
            username: r.username,
            car: CarResponse::from(r.car),
            start_date: r.start_date,
            end_date: r.end_date,
            total_price: r.total_price,
            status: r.status.to_string(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Query parameters for `GET /api/admin/rentals`.
///
/// `start_date` keeps rentals starting on or after the date, `end_date`
/// keeps rentals ending on or before it.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct AdminRentalQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub status: Option<String>,
    pub search: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl AdminRentalQuery {
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an unknown `status`.
    pub fn to_filter(&self, page: &PageRequest) -> Result<RentalFilter, AppError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_status("status", raw)?),
        };

        Ok(RentalFilter {
            offset: page.offset(),
            limit: page.limit(),
            user_id: None,
            status,
            search: non_blank(&self.search),
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// Request body for `PATCH /api/admin/rentals/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateRentalStatusRequest {
    pub status: String,
}

impl UpdateRentalStatusRequest {
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an unknown status.
    pub fn parse(&self) -> Result<RentalStatus, AppError> {
        parse_status("status", &self.status)
    }
}

fn parse_status(field: &str, raw: &str) -> Result<RentalStatus, AppError> {
    raw.parse::<RentalStatus>().map_err(|_| {
        let message = format!("\"{}\" is not a valid choice.", raw);
        AppError::bad_request(message.clone(), json!({ field: [message] }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        let query = AdminRentalQuery {
            status: Some("active".to_string()),
            search: Some("  ".to_string()),
            ..Default::default()
        };
        let filter = query
            .to_filter(&PageRequest { page: 1, page_size: 20 })
            .unwrap();

        assert_eq!(filter.status, Some(RentalStatus::Active));
        assert_eq!(filter.search, None);
        assert_eq!(filter.user_id, None);
    }

    #[test]
    fn test_date_range_from_query_string() {
        let query: AdminRentalQuery = serde_json::from_value(json!({
            "start_date": "2025-03-01",
            "end_date": "2025-03-31"
        }))
        .unwrap();

        let filter = query
            .to_filter(&PageRequest { page: 1, page_size: 20 })
            .unwrap();

        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(filter.end_date, NaiveDate::from_ymd_opt(2025, 3, 31));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let request = UpdateRentalStatusRequest {
            status: "returned".to_string(),
        };

        match request.parse().unwrap_err() {
            AppError::Validation { message, details } => {
                assert_eq!(message, "\"returned\" is not a valid choice.");
                assert_eq!(details["status"][0], message);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_create_request_dates() {
        let request: CreateRentalRequest = serde_json::from_value(json!({
            "car_id": 3,
            "start_date": "2025-06-01",
            "end_date": "2025-06-04"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }
}
