//! Delivery of password-reset tokens.
//!
//! The reset flow only creates the token; handing it to the user is the job
//! of a [`ResetNotifier`]. The server ships with [`LogResetNotifier`], which
//! writes the reset link to the log.

use ecoenergy_core::types::{DbId, Timestamp};

/// A reset token ready to be delivered.
#[derive(Debug, Clone)]
pub struct PasswordResetNotice {
    pub user_id: DbId,
    pub username: String,
    pub email: String,
    /// Plaintext token. Never persisted.
    pub token: String,
    pub expires_at: Timestamp,
}

/// Sends password-reset tokens to users.
pub trait ResetNotifier: Send + Sync {
    fn deliver(&self, notice: &PasswordResetNotice);
}

/// Writes reset tokens to the application log.
#[derive(Debug, Default, Clone)]
pub struct LogResetNotifier;

impl ResetNotifier for LogResetNotifier {
    fn deliver(&self, notice: &PasswordResetNotice) {
        tracing::info!(
            user_id = notice.user_id,
            username = %notice.username,
            email = %notice.email,
            expires_at = %notice.expires_at,
            token = %notice.token,
            "Password reset requested",
        );
    }
}
