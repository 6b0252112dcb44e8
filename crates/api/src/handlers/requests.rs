//! Handlers for the renovation-request resource: submission, listing,
//! reads, staff status transitions, resident resubmission, and the
//! copy-link affordance.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use reforma_core::deeplink::request_link;
use reforma_core::error::CoreError;
use reforma_core::lifecycle::{validate_transition, RequestStatus};
use reforma_core::resubmit::audit_message_body;
use reforma_core::types::DbId;
use reforma_db::models::request::{
    CreateRequest, RenovationRequest, RequestAggregate, ResubmitRequest,
};
use reforma_db::repositories::{MessageRepo, RequestRepo};
use reforma_events::DomainEvent;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::ws::broadcast_snapshot;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `POST /api/v1/requests` -- submit a new request.
///
/// Identity and unit come from the authenticated principal; the payload
/// carries only the work description. The request starts in `under_review`.
pub async fn create_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<RenovationRequest>>)> {
    if input.service_categories.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one service category is required".into(),
        )));
    }
    if input.art_number.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A technical-responsibility number is required".into(),
        )));
    }
    if input.end_date < input.start_date {
        return Err(AppError::Core(CoreError::Validation(
            "The work end date must not precede the start date".into(),
        )));
    }

    let (apartment, tower) = match (&auth.apartment, &auth.tower) {
        (Some(apartment), Some(tower)) => (apartment.clone(), tower.clone()),
        _ => {
            return Err(AppError::Core(CoreError::Validation(
                "Only a principal with a registered unit may submit a request".into(),
            )))
        }
    };

    let request = RequestRepo::create(
        &state.pool,
        &auth.tax_id,
        &auth.display_name,
        &apartment,
        &tower,
        &input,
    )
    .await?;

    tracing::info!(
        request_id = request.id,
        art_number = %request.art_number,
        "renovation request submitted"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(request))))
}

/// `GET /api/v1/requests` -- list requests.
///
/// Reviewers see every request; residents see only their own.
pub async fn list_requests(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<RenovationRequest>>>> {
    let requests = if auth.can_review() {
        let limit = params.limit.unwrap_or(50).clamp(1, 200);
        let offset = params.offset.unwrap_or(0).max(0);
        RequestRepo::list_all(&state.pool, limit, offset).await?
    } else {
        RequestRepo::list_for_resident(&state.pool, &auth.tax_id).await?
    };
    Ok(Json(DataResponse::new(requests)))
}

/// `GET /api/v1/requests/{id}` -- read the full aggregate.
pub async fn get_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RequestAggregate>>> {
    let aggregate = load_authorized_aggregate(&state, &auth, id).await?;
    Ok(Json(DataResponse::new(aggregate)))
}

#[derive(Debug, Deserialize)]
pub struct TransitionBody {
    pub status: String,
}

/// `PUT /api/v1/requests/{id}/status` -- staff status transition.
///
/// The resubmission transition is not reachable here: moving back to
/// `under_review` requires the full resubmission payload and goes through
/// the resubmit operation instead.
pub async fn transition_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<TransitionBody>,
) -> AppResult<Json<DataResponse<RenovationRequest>>> {
    let requested = RequestStatus::parse(&body.status)?;
    if requested == RequestStatus::UnderReview {
        return Err(AppError::Core(CoreError::Validation(
            "A request returns to review only through resubmission".into(),
        )));
    }

    let request = find_request(&state, id).await?;
    let current = RequestStatus::parse(&request.status)?;
    let is_owner = request.resident_tax_id == auth.tax_id;
    validate_transition(current, requested, auth.can_review(), is_owner)?;

    if !RequestRepo::update_status(&state.pool, id, requested.as_str()).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "request",
            id,
        }));
    }

    tracing::info!(
        request_id = id,
        from = %current,
        to = %requested,
        actor = %auth.tax_id,
        "request status changed"
    );

    state.event_bus.publish(DomainEvent::StatusChanged {
        request_id: id,
        art_number: request.art_number.clone(),
        resident_tax_id: request.resident_tax_id.clone(),
        new_status: requested.as_str().to_string(),
        actor_name: auth.display_name.clone(),
        is_resubmission: false,
        timestamp: Utc::now(),
    });
    broadcast_snapshot(&state.pool, &state.hub, id).await;

    let updated = find_request(&state, id).await?;
    Ok(Json(DataResponse::new(updated)))
}

/// `POST /api/v1/requests/{id}/resubmit` -- resident resubmission.
///
/// Appends the synthetic audit message first, then rewrites the fields and
/// resets the status to `under_review`. The audit message is authored by
/// the resubmitting resident and survives even if the status rewrite races
/// a concurrent staff transition.
pub async fn resubmit_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ResubmitRequest>,
) -> AppResult<Json<DataResponse<RenovationRequest>>> {
    if input.service_categories.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one service category is required".into(),
        )));
    }
    if input.end_date < input.start_date {
        return Err(AppError::Core(CoreError::Validation(
            "The work end date must not precede the start date".into(),
        )));
    }

    let request = find_request(&state, id).await?;
    let current = RequestStatus::parse(&request.status)?;
    let is_owner = request.resident_tax_id == auth.tax_id;
    validate_transition(
        current,
        RequestStatus::UnderReview,
        auth.can_review(),
        is_owner,
    )?;

    // Audit message commits before the status rewrite.
    let body = audit_message_body(&request.tracked_fields(), &input.tracked_fields());
    MessageRepo::append(&state.pool, id, &body, &auth.display_name, false).await?;

    let updated = RequestRepo::apply_resubmission(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "request",
            id,
        }))?;

    tracing::info!(request_id = id, actor = %auth.tax_id, "request resubmitted");

    state.event_bus.publish(DomainEvent::StatusChanged {
        request_id: id,
        art_number: updated.art_number.clone(),
        resident_tax_id: updated.resident_tax_id.clone(),
        new_status: RequestStatus::UnderReview.as_str().to_string(),
        actor_name: auth.display_name.clone(),
        is_resubmission: true,
        timestamp: Utc::now(),
    });
    broadcast_snapshot(&state.pool, &state.hub, id).await;

    Ok(Json(DataResponse::new(updated)))
}

/// `GET /api/v1/requests/{id}/link` -- deep link for sharing.
pub async fn get_request_link(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Value>>> {
    let aggregate = load_authorized_aggregate(&state, &auth, id).await?;
    let link = request_link(&aggregate.request.art_number);
    Ok(Json(DataResponse::new(json!({ "link": link }))))
}

/// Fetch a request row or map its absence to `NotFound`.
pub(crate) async fn find_request(state: &AppState, id: DbId) -> AppResult<RenovationRequest> {
    RequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "request",
            id,
        }))
}

/// Load the aggregate after the owner-or-reviewer read check.
pub(crate) async fn load_authorized_aggregate(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<RequestAggregate> {
    let aggregate = RequestRepo::load_aggregate(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "request",
            id,
        }))?;
    authorize_read(auth, &aggregate.request)?;
    Ok(aggregate)
}

/// A request is readable by its owning resident and by any reviewer.
pub(crate) fn authorize_read(auth: &AuthUser, request: &RenovationRequest) -> AppResult<()> {
    if request.resident_tax_id == auth.tax_id || auth.can_review() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Unauthorized(
            "Not authorized for this request".into(),
        )))
    }
}
