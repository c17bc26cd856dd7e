//! Refresh-token sessions.

use reefnet_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A refresh token issued to a user. Consumed exactly once.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: DbId,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    /// Set when the token is rotated or the user logs out.
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
