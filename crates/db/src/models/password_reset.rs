//! Password reset token model.

use ecoenergy_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `password_reset_tokens` table. Only the token hash is stored.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub consumed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
