//! Moderated content kinds and field validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a content title, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a content body, in characters.
pub const MAX_CONTENT_LENGTH: usize = 50_000;

/// Maximum number of ids accepted by a single bulk action.
pub const MAX_BULK_IDS: usize = 500;

/// The two kinds of user-submitted content that go through moderation.
///
/// Both share one row shape; the kind only selects the backing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    TextGuide,
    ForumPost,
}

impl ContentKind {
    /// Backing table name. Only ever one of two static identifiers.
    pub fn table(self) -> &'static str {
        match self {
            ContentKind::TextGuide => "text_guides",
            ContentKind::ForumPost => "forum_posts",
        }
    }

    /// Entity name used in not-found errors and logs.
    pub fn entity_name(self) -> &'static str {
        match self {
            ContentKind::TextGuide => "TextGuide",
            ContentKind::ForumPost => "ForumPost",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentKind::TextGuide => "text_guide",
            ContentKind::ForumPost => "forum_post",
        })
    }
}

/// Validate a title: non-blank and at most [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a body: non-blank and at most [`MAX_CONTENT_LENGTH`] characters.
pub fn validate_content(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation("Content must not be empty".to_string()));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Content exceeds maximum length of {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate the id list of a bulk action and return it deduplicated, in
/// first-seen order.
pub fn validate_bulk_ids(ids: &[i64]) -> Result<Vec<i64>, CoreError> {
    if ids.is_empty() {
        return Err(CoreError::Validation(
            "At least one id is required for a bulk action".to_string(),
        ));
    }
    if ids.len() > MAX_BULK_IDS {
        return Err(CoreError::Validation(format!(
            "A bulk action accepts at most {MAX_BULK_IDS} ids"
        )));
    }
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    Ok(ids.iter().copied().filter(|id| seen.insert(*id)).collect())
}
