//! Handlers for the inspection ledger: appending records and deleting
//! them within the correction window.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use reforma_core::error::CoreError;
use reforma_core::inspection::{delete_window_open, validate_new_inspection, InspectionOutcome};
use reforma_core::types::DbId;
use reforma_db::models::inspection::{CreateInspection, Inspection};
use reforma_db::repositories::{InspectionRepo, RequestRepo};
use reforma_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::requests::find_request;
use crate::middleware::rbac::RequireReviewer;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::ws::broadcast_snapshot;

/// `POST /api/v1/requests/{id}/inspections` -- append a ledger record.
///
/// Approved and rejected outcomes rewrite the request status as a side
/// effect; a scheduled outcome notifies the engineering pool instead.
pub async fn create_inspection(
    RequireReviewer(auth): RequireReviewer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateInspection>,
) -> AppResult<(StatusCode, Json<DataResponse<Inspection>>)> {
    let outcome = validate_new_inspection(&input.outcome, &input.photo_refs)?;
    let request = find_request(&state, id).await?;

    let inspection = InspectionRepo::create(&state.pool, id, &auth.display_name, &input).await?;

    tracing::info!(
        request_id = id,
        inspection_id = inspection.id,
        outcome = %outcome,
        "inspection recorded"
    );

    if let Some(new_status) = outcome.status_side_effect() {
        if RequestRepo::update_status(&state.pool, id, new_status.as_str()).await? {
            state.event_bus.publish(DomainEvent::StatusChanged {
                request_id: id,
                art_number: request.art_number.clone(),
                resident_tax_id: request.resident_tax_id.clone(),
                new_status: new_status.as_str().to_string(),
                actor_name: auth.display_name.clone(),
                is_resubmission: false,
                timestamp: Utc::now(),
            });
        }
    }

    if outcome == InspectionOutcome::Scheduled {
        state.event_bus.publish(DomainEvent::InspectionRequested {
            request_id: id,
            art_number: request.art_number.clone(),
            scheduled_for: inspection.occurred_on,
            author_name: auth.display_name.clone(),
            timestamp: Utc::now(),
        });
    }

    broadcast_snapshot(&state.pool, &state.hub, id).await;

    Ok((StatusCode::CREATED, Json(DataResponse::new(inspection))))
}

/// `DELETE /api/v1/requests/{id}/inspections/{inspection_id}` -- delete a
/// record inside the one-hour correction window.
///
/// Past the window the record is immutable audit evidence. Deleting a
/// record never reverts the status side effect its creation caused.
pub async fn delete_inspection(
    RequireReviewer(_auth): RequireReviewer,
    State(state): State<AppState>,
    Path((id, inspection_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_request(&state, id).await?;

    let inspection = InspectionRepo::find_by_id(&state.pool, id, inspection_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "inspection",
            id: inspection_id,
        }))?;

    if !delete_window_open(inspection.created_at, Utc::now()) {
        return Err(AppError::Core(CoreError::WindowExpired(
            "Inspection records can only be deleted within one hour of creation".into(),
        )));
    }

    if !InspectionRepo::delete(&state.pool, inspection_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "inspection",
            id: inspection_id,
        }));
    }

    tracing::info!(request_id = id, inspection_id, "inspection deleted");

    broadcast_snapshot(&state.pool, &state.hub, id).await;

    Ok(StatusCode::NO_CONTENT)
}
