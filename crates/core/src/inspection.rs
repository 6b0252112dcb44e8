//! Inspection ledger rules: outcome vocabulary, photo requirements, the
//! deletion time window, and the lifecycle side effects an outcome causes.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::RequestStatus;
use crate::types::Timestamp;

/// How long after creation an inspection record may still be deleted.
/// Past this window the record is immutable audit evidence.
pub const DELETE_WINDOW_SECS: i64 = 3600;

/// Outcome of an on-site inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionOutcome {
    Scheduled,
    Approved,
    Rejected,
    Cancelled,
}

impl InspectionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "scheduled" => Ok(Self::Scheduled),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Invalid inspection outcome '{other}'"
            ))),
        }
    }

    /// Photo evidence is required for every outcome except a future
    /// (`Scheduled`) or abandoned (`Cancelled`) inspection.
    pub fn requires_photos(&self) -> bool {
        !matches!(self, Self::Scheduled | Self::Cancelled)
    }

    /// The request-status side effect this outcome causes, if any.
    ///
    /// Deleting the record later does NOT revert the side effect; the
    /// request keeps the derived status even with no inspection evidence
    /// left. This mirrors the behavior of the system of record.
    pub fn status_side_effect(&self) -> Option<RequestStatus> {
        match self {
            Self::Approved => Some(RequestStatus::InspectionApproved),
            Self::Rejected => Some(RequestStatus::InspectionRejected),
            Self::Scheduled | Self::Cancelled => None,
        }
    }
}

impl std::fmt::Display for InspectionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a new inspection record before it is appended to the ledger.
///
/// The outcome string must parse, and photo references must be present
/// whenever the outcome requires them.
pub fn validate_new_inspection(
    outcome: &str,
    photo_refs: &[String],
) -> Result<InspectionOutcome, CoreError> {
    let outcome = InspectionOutcome::parse(outcome)?;
    if outcome.requires_photos() && photo_refs.iter().all(|p| p.trim().is_empty()) {
        return Err(CoreError::Validation(format!(
            "At least one photo reference is required for a '{outcome}' inspection"
        )));
    }
    Ok(outcome)
}

/// Returns `true` while the record may still be deleted.
///
/// The window is inclusive: a record exactly one hour old is still inside.
pub fn delete_window_open(created_at: Timestamp, now: Timestamp) -> bool {
    (now - created_at).num_seconds() <= DELETE_WINDOW_SECS
}
