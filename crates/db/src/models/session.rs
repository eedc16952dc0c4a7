//! Refresh-token sessions.

use ecoenergy_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One issued refresh token. A session is live while `revoked_at` is unset
/// and `expires_at` is in the future.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
