//! Repository for the `user_sessions` table.

use ecoenergy_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{CreateSession, UserSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, revoked_at, created_at";

/// Live sessions: not revoked, not expired.
const LIVE: &str = "revoked_at IS NULL AND expires_at > NOW()";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a live session by the hash of its refresh token.
    pub async fn find_by_refresh_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM user_sessions WHERE refresh_token_hash = $1 AND {LIVE}");
        sqlx::query_as::<_, UserSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke one session.
    ///
    /// Returns `false` when it was already revoked, so two concurrent
    /// refreshes with the same token cannot both succeed.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Revoke every live session of a user. Returns how many were revoked.
    pub async fn revoke_all_for_user<'e, E>(executor: E, user_id: DbId) -> Result<u64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE user_sessions SET revoked_at = NOW() WHERE user_id = $1 AND {LIVE}"
        );
        let result = sqlx::query(&query).bind(user_id).execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Purge sessions that can no longer be used. Returns the deleted count.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM user_sessions WHERE revoked_at IS NOT NULL OR expires_at <= NOW()",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
