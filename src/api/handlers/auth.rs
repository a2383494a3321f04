//! Handlers for JWT token issuance.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::auth::{RefreshRequest, RefreshResponse, TokenRequest, TokenResponse};
use crate::api::extract::ApiJson;
use crate::error::AppError;
use crate::state::AppState;

/// Exchanges username and password for an access/refresh token pair.
///
/// # Endpoint
///
/// `POST /api/token`
///
/// # Request Body
///
/// ```json
/// { "username": "alice", "password": "s3cret" }
/// ```
///
/// # Response
///
/// ```json
/// { "access": "eyJ...", "refresh": "eyJ...", "username": "alice", "email": "alice@example.com" }
/// ```
///
/// # Errors
///
/// Returns 401 Unauthorized for unknown users, wrong passwords and inactive
/// accounts. Returns 400 Bad Request if a field is empty.
pub async fn token_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let pair = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(TokenResponse {
        access: pair.access,
        refresh: pair.refresh,
        username: pair.username,
        email: pair.email,
    }))
}

/// Issues a new access token from a refresh token.
///
/// # Endpoint
///
/// `POST /api/token/refresh`
///
/// # Errors
///
/// Returns 401 Unauthorized if the token is invalid, expired, or is an access
/// token.
pub async fn refresh_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    payload.validate()?;

    let access = state.auth_service.refresh(&payload.refresh).await?;

    Ok(Json(RefreshResponse { access }))
}
