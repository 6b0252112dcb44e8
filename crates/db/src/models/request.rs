//! Renovation request aggregate root: row model, submission and
//! resubmission DTOs, and the full aggregate view.

use chrono::NaiveDate;
use reforma_core::resubmit::TrackedFields;
use reforma_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::inspection::Inspection;
use crate::models::message::RequestMessage;

/// A row from the `renovation_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RenovationRequest {
    pub id: DbId,
    pub resident_tax_id: String,
    pub resident_name: String,
    pub apartment: String,
    pub tower: String,
    pub work_type: String,
    pub service_categories: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub provider_name: String,
    pub provider_registration: String,
    pub art_number: String,
    pub attachment_refs: Vec<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RenovationRequest {
    /// The subset of fields the resubmission diff generator inspects.
    pub fn tracked_fields(&self) -> TrackedFields {
        TrackedFields {
            art_number: self.art_number.clone(),
            provider_name: self.provider_name.clone(),
            service_categories: self.service_categories.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            attachment_refs: self.attachment_refs.clone(),
        }
    }
}

/// DTO for submitting a new request. Identity fields (resident, unit) come
/// from the authenticated principal, never from the payload.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub work_type: String,
    pub service_categories: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub provider_name: String,
    pub provider_registration: String,
    pub art_number: String,
    #[serde(default)]
    pub attachment_refs: Vec<String>,
}

/// DTO for resubmitting a rejected request. Carries every editable field;
/// only the tracked subset participates in the audit diff.
#[derive(Debug, Deserialize)]
pub struct ResubmitRequest {
    pub work_type: String,
    pub service_categories: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub provider_name: String,
    pub provider_registration: String,
    pub art_number: String,
    #[serde(default)]
    pub attachment_refs: Vec<String>,
}

impl ResubmitRequest {
    /// The incoming side of the resubmission diff.
    pub fn tracked_fields(&self) -> TrackedFields {
        TrackedFields {
            art_number: self.art_number.clone(),
            provider_name: self.provider_name.clone(),
            service_categories: self.service_categories.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            attachment_refs: self.attachment_refs.clone(),
        }
    }
}

/// The full aggregate delivered to readers and channel subscribers:
/// the request row plus inspections (newest first) and messages (oldest
/// first).
#[derive(Debug, Clone, Serialize)]
pub struct RequestAggregate {
    #[serde(flatten)]
    pub request: RenovationRequest,
    pub inspections: Vec<Inspection>,
    pub messages: Vec<RequestMessage>,
}
