//! Repository for the `password_reset_tokens` table.

use ecoenergy_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::password_reset::PasswordResetToken;

const COLUMNS: &str = "id, user_id, token_hash, expires_at, consumed_at, created_at";

/// Provides operations on single-use password reset tokens.
pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Store the hash of a freshly issued token.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<PasswordResetToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordResetToken>(&query)
            .bind(user_id)
            .bind(token_hash)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an unconsumed, unexpired token by hash.
    pub async fn find_active_by_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM password_reset_tokens
             WHERE token_hash = $1 AND consumed_at IS NULL AND expires_at > NOW()"
        );
        sqlx::query_as::<_, PasswordResetToken>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Mark a token consumed. Returns `false` if it was already used, which
    /// guards against two concurrent confirmations.
    pub async fn consume<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE password_reset_tokens SET consumed_at = NOW()
             WHERE id = $1 AND consumed_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
