//! Repository for the `device_tokens` table (opaque push-transport tokens).

use sqlx::PgPool;

pub struct DeviceTokenRepo;

impl DeviceTokenRepo {
    /// Register a token for a principal. Idempotent per (tax_id, token).
    pub async fn register(pool: &PgPool, tax_id: &str, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO device_tokens (tax_id, token)
             VALUES ($1, $2)
             ON CONFLICT (tax_id, token) DO NOTHING",
        )
        .bind(tax_id)
        .bind(token)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove a token for a principal (e.g. on logout).
    pub async fn unregister(pool: &PgPool, tax_id: &str, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM device_tokens WHERE tax_id = $1 AND token = $2")
            .bind(tax_id)
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All tokens registered by any of the given principals.
    pub async fn tokens_for(
        pool: &PgPool,
        tax_ids: &[String],
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT token FROM device_tokens WHERE tax_id = ANY($1)")
            .bind(tax_ids)
            .fetch_all(pool)
            .await
    }
}
