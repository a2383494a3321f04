//! Handlers for the caller's own rentals.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::pagination::{Paginated, PaginationParams};
use crate::api::dto::rental::{CreateRentalRequest, RentalResponse};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::application::services::AuthUser;
use crate::domain::entities::RentalFilter;
use crate::error::AppError;
use crate::state::AppState;

pub(crate) const DEFAULT_PAGE_SIZE: u32 = 20;
pub(crate) const MAX_PAGE_SIZE: u32 = 100;

/// Lists the caller's rentals, newest first.
///
/// # Endpoint
///
/// `GET /api/rentals?page=1&page_size=20`
///
/// Each rental embeds its car (with images) and the owner's username.
pub async fn rental_list_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<Paginated<RentalResponse>>, AppError> {
    let page = params.resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    let filter = RentalFilter::new(page.offset(), page.limit()).for_user(user.id);

    let (rentals, total) = state.rental_service.list(filter).await?;

    let body = Paginated::new(
        page,
        total,
        rentals.into_iter().map(RentalResponse::from).collect(),
    )?;

    Ok(Json(body))
}

/// Books a car for the caller.
///
/// # Endpoint
///
/// `POST /api/rentals`
///
/// # Request Body
///
/// ```json
/// { "car_id": 3, "start_date": "2025-07-01", "end_date": "2025-07-04" }
/// ```
///
/// Both dates are inclusive. The total price is the car's daily price times
/// the number of days. The rental starts out `pending`.
///
/// # Errors
///
/// Returns 400 Bad Request if the car does not exist, the dates are reversed,
/// the car is unavailable or the car is already booked for any of the dates.
pub async fn create_rental_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateRentalRequest>,
) -> Result<(StatusCode, Json<RentalResponse>), AppError> {
    payload.validate()?;

    let rental = state
        .rental_service
        .create(user.id, payload.car_id, payload.start_date, payload.end_date)
        .await?;

    Ok((StatusCode::CREATED, Json(RentalResponse::from(rental))))
}

/// Returns one of the caller's rentals.
///
/// # Endpoint
///
/// `GET /api/rentals/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the rental does not exist or belongs to someone
/// else.
pub async fn rental_detail_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<RentalResponse>, AppError> {
    let rental = state.rental_service.get_for_user(id, user.id).await?;
    Ok(Json(RentalResponse::from(rental)))
}

/// Cancels one of the caller's pending rentals and queues the cancellation
/// email.
///
/// # Endpoint
///
/// `POST /api/rentals/{id}/cancel`
///
/// # Errors
///
/// Returns 404 Not Found for rentals the caller does not own and 400 Bad
/// Request if the rental is no longer pending.
pub async fn cancel_rental_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<RentalResponse>, AppError> {
    let rental = state.rental_service.cancel(id, user.id).await?;
    Ok(Json(RentalResponse::from(rental)))
}
