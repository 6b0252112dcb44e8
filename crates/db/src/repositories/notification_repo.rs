//! Repository for the `notifications` table.

use reforma_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::Notification;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, recipient, category, title, body, link, request_id, \
    is_read, read_at, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    /// Create an unread notification for one recipient, returning its id.
    pub async fn create(
        pool: &PgPool,
        recipient: &str,
        category: &str,
        title: &str,
        body: &str,
        link: Option<&str>,
        request_id: Option<DbId>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO notifications (recipient, category, title, body, link, request_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(recipient)
        .bind(category)
        .bind(title)
        .bind(body)
        .bind(link)
        .bind(request_id)
        .fetch_one(pool)
        .await
    }

    /// List a recipient's notifications, newest first.
    pub async fn list_for_recipient(
        pool: &PgPool,
        recipient: &str,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = FALSE"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE recipient = $1 {filter}
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(recipient)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Acknowledge a single notification. Returns `true` if it belonged to
    /// the recipient and was still unread.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        recipient: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications
             SET is_read = TRUE, read_at = NOW()
             WHERE id = $1 AND recipient = $2 AND is_read = FALSE",
        )
        .bind(notification_id)
        .bind(recipient)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Acknowledge everything unread for a recipient, returning the count.
    pub async fn mark_all_read(pool: &PgPool, recipient: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications
             SET is_read = TRUE, read_at = NOW()
             WHERE recipient = $1 AND is_read = FALSE",
        )
        .bind(recipient)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Number of unread notifications for a recipient.
    pub async fn unread_count(pool: &PgPool, recipient: &str) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient = $1 AND is_read = FALSE",
        )
        .bind(recipient)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
