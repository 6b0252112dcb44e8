//! Handlers for push-transport device token registration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use reforma_core::error::CoreError;
use reforma_db::repositories::DeviceTokenRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeviceTokenBody {
    pub token: String,
}

/// `POST /api/v1/devices` -- register a device token for the caller.
pub async fn register_device(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<DeviceTokenBody>,
) -> AppResult<StatusCode> {
    if body.token.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A device token is required".into(),
        )));
    }
    DeviceTokenRepo::register(&state.pool, &auth.tax_id, body.token.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/devices` -- remove a device token (e.g. on logout).
pub async fn unregister_device(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<DeviceTokenBody>,
) -> AppResult<StatusCode> {
    DeviceTokenRepo::unregister(&state.pool, &auth.tax_id, body.token.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}
