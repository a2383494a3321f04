//! Staff-only handlers for inventory, bookings and payments.
//!
//! Every route here sits behind [`crate::api::middleware::auth::require_staff`].

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::car::{
    AddCarImageRequest, CAR_LIST_CACHE_PREFIX, CarImageResponse, CarResponse, CreateCarRequest,
    UpdateCarRequest,
};
use crate::api::dto::pagination::Paginated;
use crate::api::dto::payment::{AdminPaymentQuery, PaymentResponse};
use crate::api::dto::rental::{AdminRentalQuery, RentalResponse, UpdateRentalStatusRequest};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::handlers::rentals::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::AppError;
use crate::state::AppState;

/// Drops every cached car list page.
///
/// A failure is logged and the stale pages expire with their TTL.
async fn invalidate_car_lists(state: &AppState) {
    if let Err(e) = state.cache.invalidate_prefix(CAR_LIST_CACHE_PREFIX).await {
        tracing::warn!(error = ?e, "Failed to invalidate car list cache");
    }
}

/// `POST /api/admin/cars`
pub async fn create_car_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCarRequest>,
) -> Result<(StatusCode, Json<CarResponse>), AppError> {
    payload.validate()?;

    let car = state.car_service.create(payload.into()).await?;
    invalidate_car_lists(&state).await;

    Ok((StatusCode::CREATED, Json(CarResponse::from(car))))
}

/// Partially updates a car.
///
/// # Endpoint
///
/// `PATCH /api/admin/cars/{id}`
///
/// Only fields present in the body change. Setting `is_available` to false
/// stops new bookings; existing rentals are kept.
///
/// # Errors
///
/// Returns 404 Not Found if the car does not exist.
pub async fn update_car_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateCarRequest>,
) -> Result<Json<CarResponse>, AppError> {
    payload.validate()?;

    let car = state.car_service.update(id, payload.into()).await?;
    invalidate_car_lists(&state).await;

    Ok(Json(CarResponse::from(car)))
}

/// Deletes a car together with its images, rentals and payments.
///
/// # Endpoint
///
/// `DELETE /api/admin/cars/{id}`
pub async fn delete_car_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    state.car_service.delete(id).await?;
    invalidate_car_lists(&state).await;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/cars/{id}/images`
pub async fn add_car_image_handler(
    State(state): State<AppState>,
    ApiPath(car_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<AddCarImageRequest>,
) -> Result<(StatusCode, Json<CarImageResponse>), AppError> {
    payload.validate()?;

    let image = state.car_service.add_image(car_id, payload.image).await?;
    invalidate_car_lists(&state).await;

    Ok((StatusCode::CREATED, Json(CarImageResponse::from(image))))
}

/// `DELETE /api/admin/cars/{id}/images/{image_id}`
pub async fn delete_car_image_handler(
    State(state): State<AppState>,
    ApiPath((car_id, image_id)): ApiPath<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    state.car_service.delete_image(car_id, image_id).await?;
    invalidate_car_lists(&state).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists all rentals.
///
/// # Endpoint
///
/// `GET /api/admin/rentals?status=pending&search=alice&start_date=2025-03-01&page=1`
///
/// `search` matches the username, car name or brand. `start_date` and
/// `end_date` bound the rental period from either side.
pub async fn admin_rental_list_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AdminRentalQuery>,
) -> Result<Json<Paginated<RentalResponse>>, AppError> {
    let page = query.pagination.resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    let filter = query.to_filter(&page)?;

    let (rentals, total) = state.rental_service.list(filter).await?;

    let body = Paginated::new(
        page,
        total,
        rentals.into_iter().map(RentalResponse::from).collect(),
    )?;

    Ok(Json(body))
}

/// Moves a rental to a new status.
///
/// # Endpoint
///
/// `PATCH /api/admin/rentals/{id}/status`
///
/// ```json
/// { "status": "completed" }
/// ```
///
/// Completing or cancelling a rental queues the matching email.
///
/// # Errors
///
/// - 400 Bad Request for an unknown status or a disallowed transition
/// - 404 Not Found if the rental does not exist
/// - 409 Conflict if the status changed concurrently
pub async fn update_rental_status_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateRentalStatusRequest>,
) -> Result<Json<RentalResponse>, AppError> {
    let next = payload.parse()?;

    let rental = state.rental_service.set_status(id, next).await?;

    Ok(Json(RentalResponse::from(rental)))
}

/// Lists all payments, newest first.
///
/// # Endpoint
///
/// `GET /api/admin/payments?is_paid=true&paid_at=2025-02-14&search=golf`
pub async fn admin_payment_list_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AdminPaymentQuery>,
) -> Result<Json<Paginated<PaymentResponse>>, AppError> {
    let page = query.pagination.resolve(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    let filter = query.to_filter(&page)?;

    let (payments, total) = state.payment_service.list(filter).await?;

    let body = Paginated::new(
        page,
        total,
        payments.into_iter().map(PaymentResponse::from).collect(),
    )?;

    Ok(Json(body))
}

/// Records that a cash payment was collected.
///
/// # Endpoint
///
/// `POST /api/admin/payments/{id}/mark-paid`
///
/// Idempotent: an already paid payment keeps its original `paid_at`.
pub async fn mark_payment_paid_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PaymentResponse>, AppError> {
    let payment = state.payment_service.mark_paid(id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}
