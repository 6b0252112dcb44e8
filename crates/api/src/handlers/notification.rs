//! Handlers for the per-recipient notification inbox.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use reforma_core::error::CoreError;
use reforma_core::types::DbId;
use reforma_db::models::notification::Notification;
use reforma_db::repositories::NotificationRepo;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationParams {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GET /api/v1/notifications` -- the caller's inbox, newest first.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationParams>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);
    let notifications = NotificationRepo::list_for_recipient(
        &state.pool,
        &auth.tax_id,
        params.unread_only,
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse::new(notifications)))
}

/// `PUT /api/v1/notifications/{id}/read` -- acknowledge one notification.
pub async fn mark_notification_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !NotificationRepo::mark_read(&state.pool, id, &auth.tax_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "notification",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/v1/notifications/read-all` -- acknowledge everything unread.
pub async fn mark_all_notifications_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Value>>> {
    let count = NotificationRepo::mark_all_read(&state.pool, &auth.tax_id).await?;
    Ok(Json(DataResponse::new(json!({ "marked_read": count }))))
}

/// `GET /api/v1/notifications/unread-count` -- badge counter.
pub async fn unread_notification_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Value>>> {
    let count = NotificationRepo::unread_count(&state.pool, &auth.tax_id).await?;
    Ok(Json(DataResponse::new(json!({ "unread": count }))))
}
