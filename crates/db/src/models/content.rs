//! Moderated content model shared by `text_guides` and `forum_posts`.

use reefnet_core::error::CoreError;
use reefnet_core::moderation::ModerationState;
use reefnet_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `text_guides` or `forum_posts`.
///
/// `status` and the `rejection_*` columns are stored flat; use
/// [`ContentItem::moderation_state`] to read them as one state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentItem {
    pub id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub content: String,
    pub status: String,
    pub rejection_status: Option<String>,
    pub rejection_requested_by: Option<DbId>,
    pub rejection_justification: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContentItem {
    /// Decode the stored moderation columns.
    ///
    /// Fails with [`CoreError::Internal`] on a combination the workflow
    /// cannot produce.
    pub fn moderation_state(&self) -> Result<ModerationState, CoreError> {
        ModerationState::from_columns(
            &self.status,
            self.rejection_status.as_deref(),
            self.rejection_requested_by,
            self.rejection_justification.as_deref(),
        )
    }
}

/// What anonymous and non-privileged readers see of an item.
///
/// Rejection requests are moderator notes and stay out of this view.
#[derive(Debug, Clone, Serialize)]
pub struct PublicContentItem {
    pub id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub content: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&ContentItem> for PublicContentItem {
    fn from(item: &ContentItem) -> Self {
        Self {
            id: item.id,
            author_id: item.author_id,
            title: item.title.clone(),
            content: item.content.clone(),
            status: item.status.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// An item as returned by a single-item read: the full row for its author
/// and moderators, the public projection for everyone else.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ContentView {
    Full(ContentItem),
    Public(PublicContentItem),
}

/// DTO for inserting a new content item.
#[derive(Debug, Clone)]
pub struct CreateContent {
    pub author_id: DbId,
    pub title: String,
    pub content: String,
}

/// DTO for replacing title and body of an existing item.
#[derive(Debug, Clone)]
pub struct UpdateContent {
    pub title: String,
    pub content: String,
}

/// How much moderation work is waiting on one content table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct Backlog {
    /// Items awaiting a first decision.
    pub pending: i64,
    /// Rejection requests awaiting an admin.
    pub rejection_requests: i64,
}
