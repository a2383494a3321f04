//! JWT bearer authentication and the staff guard.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::application::services::AuthUser;
use crate::{error::AppError, state::AppState};

/// Authenticates requests carrying an access token.
///
/// ```text
/// Authorization: Bearer <access token>
/// ```
///
/// On success the resolved [`AuthUser`] is stored in the request extensions,
/// where handlers pick it up with `Extension<AuthUser>`.
///
/// # Errors
///
/// Returns `401 Unauthorized` if:
/// - the Authorization header is missing or malformed
/// - the token is invalid, expired or a refresh token
/// - the user no longer exists or is inactive
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Authentication credentials were not provided.",
                json!({ "reason": "Authorization header is missing or invalid" }),
            )
        })?;

    let user = st.auth_service.authenticate(&token).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Rejects non-staff callers. Must run after [`layer`].
///
/// # Errors
///
/// Returns `403 Forbidden` for regular users and `401` if no user was
/// authenticated.
pub async fn require_staff(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.extensions().get::<AuthUser>().ok_or_else(|| {
        AppError::unauthorized("Authentication credentials were not provided.", json!({}))
    })?;

    if !user.is_staff {
        tracing::debug!(user_id = user.id, path = %req.uri().path(), "Staff route refused");
        return Err(AppError::forbidden(
            "You do not have permission to perform this action.",
            json!({}),
        ));
    }

    Ok(next.run(req).await)
}
