//! Repository for the `staff_accounts` roster mirror.

use sqlx::PgPool;

use crate::models::staff::StaffAccount;

/// Column list for `staff_accounts` queries.
const COLUMNS: &str = "id, tax_id, display_name, role, is_master, is_active, created_at";

pub struct StaffRepo;

impl StaffRepo {
    /// Every active account holding the `ReviewRequests` capability:
    /// administrators, engineering, developers, and master-flagged accounts.
    pub async fn review_pool(pool: &PgPool) -> Result<Vec<StaffAccount>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM staff_accounts
             WHERE is_active = TRUE
               AND (is_master = TRUE OR role IN ($1, $2, $3))"
        );
        sqlx::query_as::<_, StaffAccount>(&query)
            .bind(reforma_core::roles::ROLE_ADMINISTRATOR)
            .bind(reforma_core::roles::ROLE_ENGINEERING)
            .bind(reforma_core::roles::ROLE_DEVELOPER)
            .fetch_all(pool)
            .await
    }

    /// Active engineering accounts -- the audience for inspection requests.
    pub async fn engineering_pool(pool: &PgPool) -> Result<Vec<StaffAccount>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM staff_accounts
             WHERE is_active = TRUE AND role = $1"
        );
        sqlx::query_as::<_, StaffAccount>(&query)
            .bind(reforma_core::roles::ROLE_ENGINEERING)
            .fetch_all(pool)
            .await
    }
}
