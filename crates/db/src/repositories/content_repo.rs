//! Repository for the moderated content tables (`text_guides`, `forum_posts`).
//!
//! Both tables share one shape, so every method takes a [`ContentKind`] that
//! selects the table. Transition writes take a `&mut PgConnection` so the
//! caller can lock, evaluate and persist inside one transaction.

use reefnet_core::content::ContentKind;
use reefnet_core::moderation::{
    ModerationState, REJECTION_PENDING, STATUS_APPROVED, STATUS_PENDING,
};
use reefnet_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::content::{Backlog, ContentItem, CreateContent, UpdateContent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, author_id, title, content, status, rejection_status, \
                        rejection_requested_by, rejection_justification, created_at, updated_at";

/// Default page size for listings.
pub const DEFAULT_LIMIT: i64 = 50;

/// Upper bound on page size for listings.
pub const MAX_LIMIT: i64 = 200;

/// Clamp a caller-supplied page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Clamp a caller-supplied offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Filters for [`ContentRepo::list`]. `None` fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub status: Option<String>,
    pub author_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ContentFilter {
    /// Only items visible to anonymous readers.
    pub fn public() -> Self {
        Self {
            status: Some(STATUS_APPROVED.to_string()),
            ..Self::default()
        }
    }
}

/// Provides CRUD and moderation persistence for content items.
pub struct ContentRepo;

impl ContentRepo {
    /// Insert a new item in its initial moderation state, returning the row.
    pub async fn create(
        pool: &PgPool,
        kind: ContentKind,
        input: &CreateContent,
        state: &ModerationState,
    ) -> Result<ContentItem, sqlx::Error> {
        let cols = state.to_columns();
        let query = format!(
            "INSERT INTO {table}
                (author_id, title, content, status, rejection_status,
                 rejection_requested_by, rejection_justification)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}",
            table = kind.table()
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(input.author_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(cols.status)
            .bind(cols.rejection_status)
            .bind(cols.rejection_requested_by)
            .bind(&cols.rejection_justification)
            .fetch_one(pool)
            .await
    }

    /// Find an item by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        kind: ContentKind,
        id: DbId,
    ) -> Result<Option<ContentItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", kind.table());
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an item by ID and lock its row until the transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        kind: ContentKind,
        id: DbId,
    ) -> Result<Option<ContentItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE id = $1 FOR UPDATE",
            kind.table()
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List items, newest first.
    pub async fn list(
        pool: &PgPool,
        kind: ContentKind,
        filter: &ContentFilter,
    ) -> Result<Vec<ContentItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {}
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::BIGINT IS NULL OR author_id = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4",
            kind.table()
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(&filter.status)
            .bind(filter.author_id)
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset))
            .fetch_all(pool)
            .await
    }

    /// List items with an outstanding rejection request, oldest request first.
    ///
    /// Paged like [`ContentRepo::list`].
    pub async fn list_pending_rejection_requests(
        pool: &PgPool,
        kind: ContentKind,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ContentItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {}
             WHERE rejection_status = $1
             ORDER BY updated_at ASC, id ASC
             LIMIT $2 OFFSET $3",
            kind.table()
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(REJECTION_PENDING)
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    pub async fn backlog(pool: &PgPool, kind: ContentKind) -> Result<Backlog, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FILTER (WHERE status = $1) AS pending,
                    COUNT(*) FILTER (WHERE rejection_status = $2) AS rejection_requests
             FROM {}",
            kind.table()
        );
        sqlx::query_as::<_, Backlog>(&query)
            .bind(STATUS_PENDING)
            .bind(REJECTION_PENDING)
            .fetch_one(pool)
            .await
    }

    /// Persist every moderation column of one item in a single statement.
    ///
    /// Returns `None` if the row no longer exists.
    pub async fn save_moderation(
        conn: &mut PgConnection,
        kind: ContentKind,
        id: DbId,
        state: &ModerationState,
    ) -> Result<Option<ContentItem>, sqlx::Error> {
        let cols = state.to_columns();
        let query = format!(
            "UPDATE {} SET
                status = $2,
                rejection_status = $3,
                rejection_requested_by = $4,
                rejection_justification = $5
             WHERE id = $1
             RETURNING {COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(id)
            .bind(cols.status)
            .bind(cols.rejection_status)
            .bind(cols.rejection_requested_by)
            .bind(&cols.rejection_justification)
            .fetch_optional(conn)
            .await
    }

    /// Replace title and body together with the moderation columns.
    ///
    /// Returns `None` if the row no longer exists.
    pub async fn save_edit(
        conn: &mut PgConnection,
        kind: ContentKind,
        id: DbId,
        input: &UpdateContent,
        state: &ModerationState,
    ) -> Result<Option<ContentItem>, sqlx::Error> {
        let cols = state.to_columns();
        let query = format!(
            "UPDATE {} SET
                title = $2,
                content = $3,
                status = $4,
                rejection_status = $5,
                rejection_requested_by = $6,
                rejection_justification = $7
             WHERE id = $1
             RETURNING {COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, ContentItem>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(cols.status)
            .bind(cols.rejection_status)
            .bind(cols.rejection_requested_by)
            .bind(&cols.rejection_justification)
            .fetch_optional(conn)
            .await
    }

    /// Hard-delete an item. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, kind: ContentKind, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Of the given IDs, return those that exist, locking their rows.
    pub async fn lock_existing_ids(
        conn: &mut PgConnection,
        kind: ContentKind,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let query = format!(
            "SELECT id FROM {} WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            kind.table()
        );
        sqlx::query_scalar::<_, DbId>(&query)
            .bind(ids)
            .fetch_all(conn)
            .await
    }

    /// Move every listed item into `state`. Returns the IDs updated.
    pub async fn bulk_save_moderation(
        conn: &mut PgConnection,
        kind: ContentKind,
        ids: &[DbId],
        state: &ModerationState,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let cols = state.to_columns();
        let query = format!(
            "UPDATE {} SET
                status = $2,
                rejection_status = $3,
                rejection_requested_by = $4,
                rejection_justification = $5
             WHERE id = ANY($1)
             RETURNING id",
            kind.table()
        );
        let mut updated = sqlx::query_scalar::<_, DbId>(&query)
            .bind(ids)
            .bind(cols.status)
            .bind(cols.rejection_status)
            .bind(cols.rejection_requested_by)
            .bind(&cols.rejection_justification)
            .fetch_all(conn)
            .await?;
        updated.sort_unstable();
        Ok(updated)
    }

    /// Hard-delete every listed item. Returns the IDs actually deleted.
    pub async fn bulk_delete(
        conn: &mut PgConnection,
        kind: ContentKind,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = ANY($1) RETURNING id", kind.table());
        let mut deleted = sqlx::query_scalar::<_, DbId>(&query)
            .bind(ids)
            .fetch_all(conn)
            .await?;
        deleted.sort_unstable();
        Ok(deleted)
    }
}
