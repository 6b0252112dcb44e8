//! Handler for posting to a request's message channel.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use reforma_core::channel::validate_message_body;
use reforma_core::types::DbId;
use reforma_db::models::message::{CreateMessage, RequestMessage};
use reforma_db::repositories::MessageRepo;
use reforma_events::DomainEvent;

use crate::error::AppResult;
use crate::handlers::requests::{authorize_read, find_request};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::ws::broadcast_snapshot;

/// Characters of the message body carried into the notification preview.
const PREVIEW_LEN: usize = 120;

/// `POST /api/v1/requests/{id}/messages` -- append a message.
///
/// Appends are atomic single-row inserts; two concurrent posters on the
/// same request both survive. History reaches readers through the
/// aggregate snapshot.
pub async fn post_message(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateMessage>,
) -> AppResult<(StatusCode, Json<DataResponse<RequestMessage>>)> {
    let request = find_request(&state, id).await?;
    authorize_read(&auth, &request)?;

    let body = validate_message_body(&input.body)?;
    let author_is_staff = auth.can_review();

    let message =
        MessageRepo::append(&state.pool, id, &body, &auth.display_name, author_is_staff).await?;

    tracing::debug!(request_id = id, message_id = message.id, "message posted");

    state.event_bus.publish(DomainEvent::MessagePosted {
        request_id: id,
        art_number: request.art_number.clone(),
        resident_tax_id: request.resident_tax_id.clone(),
        author_tax_id: auth.tax_id.clone(),
        author_name: auth.display_name.clone(),
        author_is_staff,
        preview: preview(&body),
        timestamp: Utc::now(),
    });
    broadcast_snapshot(&state.pool, &state.hub, id).await;

    Ok((StatusCode::CREATED, Json(DataResponse::new(message))))
}

/// Truncate a body to the preview length at a character boundary.
fn preview(body: &str) -> String {
    if body.chars().count() <= PREVIEW_LEN {
        body.to_string()
    } else {
        let truncated: String = body.chars().take(PREVIEW_LEN).collect();
        format!("{truncated}…")
    }
}
