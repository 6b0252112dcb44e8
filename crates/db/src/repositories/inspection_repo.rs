//! Repository for the `inspections` table (the inspection ledger).

use reforma_core::types::DbId;
use sqlx::PgPool;

use crate::models::inspection::{CreateInspection, Inspection};

/// Column list for `inspections` queries.
const COLUMNS: &str =
    "id, request_id, outcome, occurred_on, notes, photo_refs, author_name, created_at";

/// Append-mostly ledger of inspection records. Rows are never updated in
/// place; deletion is allowed only within the one-hour window, which the
/// caller checks against `created_at`.
pub struct InspectionRepo;

impl InspectionRepo {
    /// Append a record to a request's ledger, returning the created row.
    pub async fn create(
        pool: &PgPool,
        request_id: DbId,
        author_name: &str,
        input: &CreateInspection,
    ) -> Result<Inspection, sqlx::Error> {
        let query = format!(
            "INSERT INTO inspections
                (request_id, outcome, occurred_on, notes, photo_refs, author_name)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Inspection>(&query)
            .bind(request_id)
            .bind(&input.outcome)
            .bind(input.occurred_on)
            .bind(&input.notes)
            .bind(&input.photo_refs)
            .bind(author_name)
            .fetch_one(pool)
            .await
    }

    /// Find one record scoped to its request.
    pub async fn find_by_id(
        pool: &PgPool,
        request_id: DbId,
        inspection_id: DbId,
    ) -> Result<Option<Inspection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inspections
             WHERE id = $1 AND request_id = $2"
        );
        sqlx::query_as::<_, Inspection>(&query)
            .bind(inspection_id)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    /// List a request's records, newest first.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<Inspection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inspections
             WHERE request_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Inspection>(&query)
            .bind(request_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a record. The deletion-window check happens in the handler;
    /// no status side effect is reversed here.
    pub async fn delete(pool: &PgPool, inspection_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM inspections WHERE id = $1")
            .bind(inspection_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
