//! Accounts, joined with `roles` so every row carries its role name.

use reefnet_core::roles::Role;
use reefnet_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Projection over `users u JOIN roles r`.
const FIELDS: &str = "u.id, u.username, u.email, u.password_hash, r.name AS role, u.is_active, \
                      u.last_login_at, u.failed_login_count, u.locked_until, \
                      u.created_at, u.updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert an account with the role named by `input.role`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "WITH u AS (
                INSERT INTO users (username, email, password_hash, role_id)
                SELECT $1, $2, $3, id FROM roles WHERE name = $4
                RETURNING *
             )
             SELECT {FIELDS} FROM u JOIN roles r ON r.id = u.role_id"
        ))
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(input.role.as_str())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {FIELDS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Exact, case-sensitive match on the login name.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {FIELDS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Point the account at another role. `None` when the account does not exist.
    pub async fn set_role(
        pool: &PgPool,
        id: DbId,
        role: Role,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "WITH u AS (
                UPDATE users SET role_id = (SELECT id FROM roles WHERE name = $2)
                WHERE id = $1
                RETURNING *
             )
             SELECT {FIELDS} FROM u JOIN roles r ON r.id = u.role_id"
        ))
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Count a bad password. Once the count reaches `max_attempts` the account
    /// is locked for `lock_minutes`; the new `locked_until` is returned.
    ///
    /// A lock that has already run out restarts the count, so the first
    /// miss after it expires counts as attempt one.
    pub async fn record_failed_login(
        pool: &PgPool,
        id: DbId,
        max_attempts: i32,
        lock_minutes: i32,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<Timestamp>>(
            "WITH attempt AS (
                SELECT id,
                       CASE WHEN locked_until <= NOW() THEN 1
                            ELSE failed_login_count + 1
                       END AS n
                FROM users WHERE id = $1
                FOR UPDATE
             )
             UPDATE users u SET
                failed_login_count = attempt.n,
                locked_until = CASE
                    WHEN attempt.n >= $2 THEN NOW() + make_interval(mins => $3)
                    WHEN u.locked_until <= NOW() THEN NULL
                    ELSE u.locked_until
                END
             FROM attempt
             WHERE u.id = attempt.id
             RETURNING u.locked_until",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(lock_minutes)
        .fetch_one(pool)
        .await
    }

    /// Clear the failure counter and any lock, and stamp `last_login_at`.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users
             SET failed_login_count = 0, locked_until = NULL, last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
