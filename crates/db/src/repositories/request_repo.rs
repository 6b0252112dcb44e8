//! Repository for the `renovation_requests` table.

use reforma_core::types::DbId;
use sqlx::PgPool;

use crate::models::request::{CreateRequest, RenovationRequest, RequestAggregate, ResubmitRequest};
use crate::repositories::{InspectionRepo, MessageRepo};

/// Column list for `renovation_requests` queries.
const COLUMNS: &str = "id, resident_tax_id, resident_name, apartment, tower, work_type, \
    service_categories, start_date, end_date, provider_name, provider_registration, \
    art_number, attachment_refs, status, created_at, updated_at";

/// Owns reads and writes of the request aggregate root. The embedded lists
/// live in their own repositories so appends stay atomic single-row inserts.
pub struct RequestRepo;

impl RequestRepo {
    /// Insert a new request with status `under_review`, returning the row.
    ///
    /// A duplicate technical-responsibility number violates the
    /// `uq_renovation_requests_art` index; the caller maps that database
    /// error to the specific duplicate-ART conflict.
    pub async fn create(
        pool: &PgPool,
        resident_tax_id: &str,
        resident_name: &str,
        apartment: &str,
        tower: &str,
        input: &CreateRequest,
    ) -> Result<RenovationRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO renovation_requests
                (resident_tax_id, resident_name, apartment, tower, work_type,
                 service_categories, start_date, end_date, provider_name,
                 provider_registration, art_number, attachment_refs)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RenovationRequest>(&query)
            .bind(resident_tax_id)
            .bind(resident_name)
            .bind(apartment)
            .bind(tower)
            .bind(&input.work_type)
            .bind(&input.service_categories)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.provider_name)
            .bind(&input.provider_registration)
            .bind(&input.art_number)
            .bind(&input.attachment_refs)
            .fetch_one(pool)
            .await
    }

    /// Find a request by id, excluding soft-deleted rows.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RenovationRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM renovation_requests
             WHERE id = $1 AND is_deleted = FALSE"
        );
        sqlx::query_as::<_, RenovationRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every non-deleted request, newest first (review pool view).
    pub async fn list_all(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RenovationRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM renovation_requests
             WHERE is_deleted = FALSE
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, RenovationRequest>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List a resident's own requests, newest first.
    pub async fn list_for_resident(
        pool: &PgPool,
        resident_tax_id: &str,
    ) -> Result<Vec<RenovationRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM renovation_requests
             WHERE resident_tax_id = $1 AND is_deleted = FALSE
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, RenovationRequest>(&query)
            .bind(resident_tax_id)
            .fetch_all(pool)
            .await
    }

    /// Rewrite a request's status, stamping `updated_at`.
    ///
    /// Last write wins by design; message appends are never affected
    /// because they live in their own table. Returns `false` when the
    /// request does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE renovation_requests
             SET status = $2, updated_at = NOW()
             WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rewrite the editable fields and reset status to `under_review`.
    ///
    /// Called after the synthetic audit message has been appended, so the
    /// channel entry commits before the status rewrite.
    pub async fn apply_resubmission(
        pool: &PgPool,
        id: DbId,
        input: &ResubmitRequest,
    ) -> Result<Option<RenovationRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE renovation_requests
             SET work_type = $2,
                 service_categories = $3,
                 start_date = $4,
                 end_date = $5,
                 provider_name = $6,
                 provider_registration = $7,
                 art_number = $8,
                 attachment_refs = $9,
                 status = 'under_review',
                 updated_at = NOW()
             WHERE id = $1 AND is_deleted = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RenovationRequest>(&query)
            .bind(id)
            .bind(&input.work_type)
            .bind(&input.service_categories)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.provider_name)
            .bind(&input.provider_registration)
            .bind(&input.art_number)
            .bind(&input.attachment_refs)
            .fetch_optional(pool)
            .await
    }

    /// Load the full aggregate: request row, inspections newest-first,
    /// messages oldest-first.
    pub async fn load_aggregate(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RequestAggregate>, sqlx::Error> {
        let Some(request) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let inspections = InspectionRepo::list_for_request(pool, id).await?;
        let messages = MessageRepo::list_for_request(pool, id).await?;
        Ok(Some(RequestAggregate {
            request,
            inspections,
            messages,
        }))
    }
}
