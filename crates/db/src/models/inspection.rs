//! Inspection record models.

use chrono::NaiveDate;
use reforma_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `inspections` table. Immutable once created; deletable
/// only within the one-hour window after creation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Inspection {
    pub id: DbId,
    pub request_id: DbId,
    pub outcome: String,
    pub occurred_on: NaiveDate,
    pub notes: Option<String>,
    pub photo_refs: Vec<String>,
    pub author_name: String,
    pub created_at: Timestamp,
}

/// DTO for appending an inspection to a request's ledger.
#[derive(Debug, Deserialize)]
pub struct CreateInspection {
    pub outcome: String,
    pub occurred_on: NaiveDate,
    pub notes: Option<String>,
    #[serde(default)]
    pub photo_refs: Vec<String>,
}
