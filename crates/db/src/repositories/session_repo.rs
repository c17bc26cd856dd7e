//! Refresh-token bookkeeping over `user_sessions`.

use reefnet_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::RefreshSession;

const FIELDS: &str = "id, user_id, expires_at, revoked_at, created_at";

pub struct SessionRepo;

impl SessionRepo {
    /// Record a freshly issued refresh token by its hash.
    pub async fn open(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<RefreshSession, sqlx::Error> {
        sqlx::query_as::<_, RefreshSession>(&format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {FIELDS}"
        ))
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    /// Revoke the live, unexpired session matching `token_hash` and return it.
    ///
    /// The check and the revocation are one statement, so two concurrent
    /// refreshes with the same token cannot both succeed.
    pub async fn consume(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        sqlx::query_as::<_, RefreshSession>(&format!(
            "UPDATE user_sessions SET revoked_at = NOW()
             WHERE refresh_token_hash = $1
               AND revoked_at IS NULL
               AND expires_at > NOW()
             RETURNING {FIELDS}"
        ))
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Revoke every live session of a user. Returns how many were revoked.
    pub async fn revoke_all(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let done = sqlx::query(
            "UPDATE user_sessions SET revoked_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(done.rows_affected())
    }
}
