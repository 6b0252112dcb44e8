//! Request status vocabulary and the guarded transition rules.
//!
//! Review is manual: a staff member holding `ReviewRequests` may move a
//! request to any staff-reachable state at any time. The single exception is
//! the resubmission transition back to [`RequestStatus::UnderReview`], which
//! only the owning resident may take, and only from a rejected state.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The fixed status vocabulary for a renovation request.
///
/// No state is terminal: both rejected states permit a resident-initiated
/// resubmission back to `UnderReview`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    UnderReview,
    Approved,
    Rejected,
    AwaitingInspection,
    InspectionApproved,
    InspectionRejected,
    Completed,
}

/// States a staff member may move a request to via the transition operation.
/// `UnderReview` is reachable only through resident resubmission.
pub const STAFF_REACHABLE: &[RequestStatus] = &[
    RequestStatus::Approved,
    RequestStatus::Rejected,
    RequestStatus::AwaitingInspection,
    RequestStatus::InspectionApproved,
    RequestStatus::InspectionRejected,
    RequestStatus::Completed,
];

impl RequestStatus {
    /// String representation stored in the database and sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::AwaitingInspection => "awaiting_inspection",
            Self::InspectionApproved => "inspection_approved",
            Self::InspectionRejected => "inspection_rejected",
            Self::Completed => "completed",
        }
    }

    /// Parse a stored status string back into the enum.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "under_review" => Ok(Self::UnderReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "awaiting_inspection" => Ok(Self::AwaitingInspection),
            "inspection_approved" => Ok(Self::InspectionApproved),
            "inspection_rejected" => Ok(Self::InspectionRejected),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::Validation(format!(
                "Invalid request status '{other}'"
            ))),
        }
    }

    /// Returns `true` for the two states that admit resident resubmission.
    pub fn permits_resubmission(&self) -> bool {
        matches!(self, Self::Rejected | Self::InspectionRejected)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a status transition for the given actor.
///
/// - `can_review`: the actor holds the `ReviewRequests` capability.
/// - `is_owner`: the actor is the resident who owns the request.
///
/// Staff transitions carry no further guard beyond authorization; the
/// review process is manual and staff are trusted to pick a coherent next
/// state.
pub fn validate_transition(
    current: RequestStatus,
    requested: RequestStatus,
    can_review: bool,
    is_owner: bool,
) -> Result<(), CoreError> {
    if requested == RequestStatus::UnderReview {
        // Resubmission path: owning resident, from a rejected state only.
        if is_owner && current.permits_resubmission() {
            return Ok(());
        }
        return Err(CoreError::Unauthorized(
            "Only the owning resident may resubmit, and only a rejected request".into(),
        ));
    }

    if !can_review {
        return Err(CoreError::Unauthorized(
            "The ReviewRequests capability is required to change a request's status".into(),
        ));
    }

    Ok(())
}
