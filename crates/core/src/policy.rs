//! Capability policy for moderated content.
//!
//! Every handler asks [`permits`] (or [`require`]) instead of comparing role
//! strings inline. Admin holds every capability a support moderator has.

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// The user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this actor authored the item owned by `author_id`.
    pub fn owns(&self, author_id: DbId) -> bool {
        self.user_id == author_id
    }
}

/// Actions guarded by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Create a new content item.
    Submit,
    /// Directly approve or reject an item (admin decision).
    Decide,
    /// Re-approve an item or propose its rejection (support decision).
    Review,
    /// Ratify or deny an outstanding rejection request.
    ResolveRejectionRequest,
    /// Change title or body.
    Edit,
    /// Hard-delete a single item.
    Delete,
    /// Approve, reject or delete many items at once.
    BulkAction,
    /// See items regardless of status.
    ViewAll,
}

impl Permission {
    fn describe(self) -> &'static str {
        match self {
            Permission::Submit => "submit content",
            Permission::Decide => "approve or reject content",
            Permission::Review => "review content",
            Permission::ResolveRejectionRequest => "resolve rejection requests",
            Permission::Edit => "edit this content",
            Permission::Delete => "delete content",
            Permission::BulkAction => "perform bulk actions",
            Permission::ViewAll => "view unpublished content",
        }
    }
}

/// Relationship between the actor and the item being acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// No existing item (creation, listings, bulk).
    None,
    /// The item was authored by this user.
    Author(DbId),
}

/// The single authorization rule for moderated content.
pub fn permits(actor: &Actor, permission: Permission, ownership: Ownership) -> bool {
    match permission {
        Permission::Submit => true,
        Permission::Decide
        | Permission::ResolveRejectionRequest
        | Permission::Delete
        | Permission::BulkAction => actor.is_admin(),
        Permission::Review | Permission::ViewAll => actor.role >= Role::Support,
        Permission::Edit => match ownership {
            Ownership::Author(author_id) => can_edit(actor, author_id),
            Ownership::None => actor.is_admin(),
        },
    }
}

/// An item may be edited by an admin or by its author.
pub fn can_edit(actor: &Actor, author_id: DbId) -> bool {
    actor.is_admin() || actor.owns(author_id)
}

/// An unpublished item may be read by its author and by moderators.
pub fn can_view_unpublished(actor: &Actor, author_id: DbId) -> bool {
    actor.owns(author_id) || permits(actor, Permission::ViewAll, Ownership::None)
}

/// Like [`permits`], but returns a `Forbidden` error when denied.
pub fn require(actor: &Actor, permission: Permission, ownership: Ownership) -> Result<(), CoreError> {
    if permits(actor, permission, ownership) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role '{}' is not allowed to {}",
            actor.role,
            permission.describe()
        )))
    }
}
