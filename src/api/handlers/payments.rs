//! Handler for paying for a rental.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::payment::{CreatePaymentRequest, PaymentResponse};
use crate::api::extract::ApiJson;
use crate::application::services::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Records a payment for one of the caller's rentals.
///
/// # Endpoint
///
/// `POST /api/payments`
///
/// # Request Body
///
/// ```json
/// { "rental_id": 12, "payment_method": "cash" }
/// ```
///
/// Cash payments are recorded unpaid and collected at pickup. The rental
/// becomes `active` and a confirmation email is queued.
///
/// # Errors
///
/// Returns 400 Bad Request if the rental does not exist or is not the
/// caller's, already has a payment, is not pending, or the method is not
/// `cash`.
pub async fn create_payment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    payload.validate()?;
    let method = payload.method()?;

    let payment = state
        .payment_service
        .create(user.id, payload.rental_id, method)
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}
