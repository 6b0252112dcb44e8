//! Repository for the `request_messages` table.
//!
//! Messages are append-only. Each append is a single `INSERT`, so two
//! concurrent posters on the same request both survive regardless of
//! interleaving -- there is no read-modify-write of a whole list.

use reforma_core::types::DbId;
use sqlx::PgPool;

use crate::models::message::RequestMessage;

/// Column list for `request_messages` queries.
const COLUMNS: &str = "id, request_id, body, author_name, author_is_staff, created_at";

pub struct MessageRepo;

impl MessageRepo {
    /// Append a message to a request's channel, returning the created row.
    pub async fn append(
        pool: &PgPool,
        request_id: DbId,
        body: &str,
        author_name: &str,
        author_is_staff: bool,
    ) -> Result<RequestMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO request_messages (request_id, body, author_name, author_is_staff)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RequestMessage>(&query)
            .bind(request_id)
            .bind(body)
            .bind(author_name)
            .bind(author_is_staff)
            .fetch_one(pool)
            .await
    }

    /// List a request's messages, oldest first.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<RequestMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM request_messages
             WHERE request_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, RequestMessage>(&query)
            .bind(request_id)
            .fetch_all(pool)
            .await
    }
}
