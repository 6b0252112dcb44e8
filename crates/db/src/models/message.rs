//! Collaboration channel message models.

use reforma_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `request_messages` table. Append-only: never edited,
/// deleted, or reordered. Synthetic audit messages are structurally
/// identical, authored by the resubmitting resident.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequestMessage {
    pub id: DbId,
    pub request_id: DbId,
    pub body: String,
    pub author_name: String,
    pub author_is_staff: bool,
    pub created_at: Timestamp,
}

/// DTO for posting a message. The author and staff flag come from the
/// authenticated principal, never from the payload.
#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    pub body: String,
}
