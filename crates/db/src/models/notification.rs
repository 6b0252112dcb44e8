//! Notification models.

use reforma_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table: one row per (recipient, event).
/// Created unread by the dispatcher; mutated only by read-acknowledgement.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient: String,
    pub category: String,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub request_id: Option<DbId>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
