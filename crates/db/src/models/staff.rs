//! Staff roster mirror, used to resolve notification pools.

use reforma_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `staff_accounts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StaffAccount {
    pub id: DbId,
    pub tax_id: String,
    pub display_name: String,
    pub role: String,
    pub is_master: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
}
