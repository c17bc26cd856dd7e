//! Moderation state machine for text guides and forum posts.
//!
//! A content item's `status` and `rejection_status` columns are modelled as a
//! single [`ModerationState`], so combinations such as "rejected with a
//! pending rejection request" cannot be constructed. Rows that hold such a
//! combination are refused by [`ModerationState::from_columns`] rather than
//! repaired.
//!
//! ```text
//!            submit (non-admin)            submit (admin)
//!                  |                              |
//!                  v                              v
//!              Pending --admin approve-->     Approved <---------------+
//!                  |                          |      ^                 |
//!            admin reject          support    |      | support approve |
//!                  |           request-reject |      |                 |
//!                  v                          v      |                 |
//!              Rejected               RejectionRequested --admin deny--> RejectionDenied
//!                                             |
//!                                       admin ratify
//!                                             v
//!                                     RejectionApproved
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::policy::{self, Actor, Ownership, Permission};
use crate::types::DbId;

/* --------------------------------------------------------------------------
Column values
-------------------------------------------------------------------------- */

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

pub const REJECTION_PENDING: &str = "pending";
pub const REJECTION_APPROVED: &str = "approved";
pub const REJECTION_DENIED: &str = "denied";

/// Public-facing status of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Pending,
    Approved,
    Rejected,
}

impl ContentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Pending => STATUS_PENDING,
            ContentStatus::Approved => STATUS_APPROVED,
            ContentStatus::Rejected => STATUS_REJECTED,
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(ContentStatus::Pending),
            STATUS_APPROVED => Ok(ContentStatus::Approved),
            STATUS_REJECTED => Ok(ContentStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Must be one of: pending, approved, rejected"
            ))),
        }
    }
}

/// Status of a rejection request filed against an approved item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionStatus {
    Pending,
    Approved,
    Denied,
}

impl RejectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionStatus::Pending => REJECTION_PENDING,
            RejectionStatus::Approved => REJECTION_APPROVED,
            RejectionStatus::Denied => REJECTION_DENIED,
        }
    }
}

impl fmt::Display for RejectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RejectionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            REJECTION_PENDING => Ok(RejectionStatus::Pending),
            REJECTION_APPROVED => Ok(RejectionStatus::Approved),
            REJECTION_DENIED => Ok(RejectionStatus::Denied),
            other => Err(CoreError::Validation(format!(
                "Invalid rejection status '{other}'. Must be one of: pending, approved, denied"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
State
-------------------------------------------------------------------------- */

/// A support moderator's proposal to reject an approved item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionRequest {
    pub requested_by: DbId,
    pub justification: String,
}

impl RejectionRequest {
    /// Build a request, requiring a non-blank justification.
    ///
    /// The stored justification is trimmed.
    pub fn new(requested_by: DbId, justification: Option<&str>) -> Result<Self, CoreError> {
        let justification = justification.map(str::trim).unwrap_or_default();
        if justification.is_empty() {
            return Err(CoreError::Validation(
                "rejection_justification is required when requesting a rejection".to_string(),
            ));
        }
        Ok(Self {
            requested_by,
            justification: justification.to_string(),
        })
    }
}

/// Combined `status` x `rejection_status` of a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationState {
    /// Awaiting an admin decision. Not public.
    Pending,
    /// Public, no rejection request on file.
    Approved,
    /// Public, a rejection request awaits admin resolution.
    RejectionRequested(RejectionRequest),
    /// Public, the last rejection request was denied.
    RejectionDenied(RejectionRequest),
    /// Rejected directly by an admin. Not public.
    Rejected,
    /// Rejected because an admin ratified a rejection request. Not public.
    RejectionApproved(RejectionRequest),
}

/// The flat column values a [`ModerationState`] persists to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationColumns {
    pub status: &'static str,
    pub rejection_status: Option<&'static str>,
    pub rejection_requested_by: Option<DbId>,
    pub rejection_justification: Option<String>,
}

impl ModerationState {
    /// State of a freshly submitted item.
    pub fn initial(actor: &Actor) -> Self {
        if actor.is_admin() {
            ModerationState::Approved
        } else {
            ModerationState::Pending
        }
    }

    pub fn status(&self) -> ContentStatus {
        match self {
            ModerationState::Pending => ContentStatus::Pending,
            ModerationState::Approved
            | ModerationState::RejectionRequested(_)
            | ModerationState::RejectionDenied(_) => ContentStatus::Approved,
            ModerationState::Rejected | ModerationState::RejectionApproved(_) => {
                ContentStatus::Rejected
            }
        }
    }

    pub fn rejection_status(&self) -> Option<RejectionStatus> {
        match self {
            ModerationState::RejectionRequested(_) => Some(RejectionStatus::Pending),
            ModerationState::RejectionDenied(_) => Some(RejectionStatus::Denied),
            ModerationState::RejectionApproved(_) => Some(RejectionStatus::Approved),
            ModerationState::Pending | ModerationState::Approved | ModerationState::Rejected => {
                None
            }
        }
    }

    pub fn rejection_request(&self) -> Option<&RejectionRequest> {
        match self {
            ModerationState::RejectionRequested(r)
            | ModerationState::RejectionDenied(r)
            | ModerationState::RejectionApproved(r) => Some(r),
            _ => None,
        }
    }

    /// Only approved items are visible to anonymous readers.
    pub fn is_public(&self) -> bool {
        self.status() == ContentStatus::Approved
    }

    /// Flatten into the column values written by a single persist.
    pub fn to_columns(&self) -> ModerationColumns {
        let request = self.rejection_request();
        ModerationColumns {
            status: self.status().as_str(),
            rejection_status: self.rejection_status().map(RejectionStatus::as_str),
            rejection_requested_by: request.map(|r| r.requested_by),
            rejection_justification: request.map(|r| r.justification.clone()),
        }
    }

    /// Rebuild the state from stored column values.
    ///
    /// Combinations the state machine cannot produce are reported as
    /// [`CoreError::Internal`]; they indicate a row written outside this
    /// workflow.
    pub fn from_columns(
        status: &str,
        rejection_status: Option<&str>,
        requested_by: Option<DbId>,
        justification: Option<&str>,
    ) -> Result<Self, CoreError> {
        let status: ContentStatus = status
            .parse()
            .map_err(|e: CoreError| CoreError::Internal(e.to_string()))?;
        let rejection_status = rejection_status
            .map(str::parse::<RejectionStatus>)
            .transpose()
            .map_err(|e| CoreError::Internal(e.to_string()))?;

        let inconsistent = || {
            CoreError::Internal(format!(
                "Inconsistent moderation state: status={status}, rejection_status={}",
                rejection_status.map_or("null", RejectionStatus::as_str)
            ))
        };

        let request = match rejection_status {
            None => None,
            Some(_) => {
                let requested_by = requested_by.ok_or_else(inconsistent)?;
                let justification = justification
                    .filter(|j| !j.trim().is_empty())
                    .ok_or_else(inconsistent)?;
                Some(RejectionRequest {
                    requested_by,
                    justification: justification.to_string(),
                })
            }
        };

        match (status, rejection_status, request) {
            (ContentStatus::Pending, None, None) => Ok(ModerationState::Pending),
            (ContentStatus::Approved, None, None) => Ok(ModerationState::Approved),
            (ContentStatus::Approved, Some(RejectionStatus::Pending), Some(r)) => {
                Ok(ModerationState::RejectionRequested(r))
            }
            (ContentStatus::Approved, Some(RejectionStatus::Denied), Some(r)) => {
                Ok(ModerationState::RejectionDenied(r))
            }
            (ContentStatus::Rejected, None, None) => Ok(ModerationState::Rejected),
            (ContentStatus::Rejected, Some(RejectionStatus::Approved), Some(r)) => {
                Ok(ModerationState::RejectionApproved(r))
            }
            _ => Err(inconsistent()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ModerationState::Pending => "pending",
            ModerationState::Approved => "approved",
            ModerationState::RejectionRequested(_) => "approved with a pending rejection request",
            ModerationState::RejectionDenied(_) => "approved after a denied rejection request",
            ModerationState::Rejected => "rejected",
            ModerationState::RejectionApproved(_) => "rejected by an approved rejection request",
        }
    }

    /// Evaluate `action` by `actor` against an item authored by `author_id`.
    ///
    /// Returns the next state without mutating `self`; the caller persists it.
    /// Authorization is checked first (403), then input (400), then whether
    /// the transition exists from the current state (400).
    pub fn apply(
        &self,
        actor: &Actor,
        author_id: DbId,
        action: ModerationAction,
    ) -> Result<ModerationState, CoreError> {
        match action {
            ModerationAction::Decide(decision) => {
                policy::require(actor, Permission::Decide, Ownership::Author(author_id))?;
                // Admin decisions are final and clear any request on file.
                Ok(match decision {
                    Decision::Approve => ModerationState::Approved,
                    Decision::Reject => ModerationState::Rejected,
                })
            }

            ModerationAction::Review(review) => {
                policy::require(actor, Permission::Review, Ownership::Author(author_id))?;
                let next = match review {
                    ReviewDecision::Approve => ModerationState::Approved,
                    ReviewDecision::RequestRejection { justification } => {
                        ModerationState::RejectionRequested(RejectionRequest::new(
                            actor.user_id,
                            justification.as_deref(),
                        )?)
                    }
                };
                match self {
                    ModerationState::Approved
                    | ModerationState::RejectionRequested(_)
                    | ModerationState::RejectionDenied(_) => Ok(next),
                    other => Err(CoreError::InvalidTransition(format!(
                        "Cannot review an item that is {}",
                        other.name()
                    ))),
                }
            }

            ModerationAction::Resolve(resolution) => {
                policy::require(
                    actor,
                    Permission::ResolveRejectionRequest,
                    Ownership::Author(author_id),
                )?;
                match self {
                    ModerationState::RejectionRequested(request) => Ok(match resolution {
                        Resolution::Approve => ModerationState::RejectionApproved(request.clone()),
                        Resolution::Deny => ModerationState::RejectionDenied(request.clone()),
                    }),
                    other => Err(CoreError::InvalidTransition(format!(
                        "No pending rejection request: item is {}",
                        other.name()
                    ))),
                }
            }

            ModerationAction::Edit => {
                policy::require(actor, Permission::Edit, Ownership::Author(author_id))?;
                Ok(if actor.is_admin() {
                    ModerationState::Approved
                } else {
                    ModerationState::Pending
                })
            }
        }
    }
}

/* --------------------------------------------------------------------------
Actions
-------------------------------------------------------------------------- */

/// An admin's direct decision (`{"status": "approved" | "rejected"}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl FromStr for Decision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_APPROVED => Ok(Decision::Approve),
            STATUS_REJECTED => Ok(Decision::Reject),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Must be one of: approved, rejected"
            ))),
        }
    }
}

/// A support moderator's decision on an approved item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    RequestRejection { justification: Option<String> },
}

impl ReviewDecision {
    /// Build from the `{status, rejection_justification}` request body.
    pub fn from_request(status: &str, justification: Option<String>) -> Result<Self, CoreError> {
        match status.parse::<Decision>()? {
            Decision::Approve => Ok(ReviewDecision::Approve),
            Decision::Reject => Ok(ReviewDecision::RequestRejection { justification }),
        }
    }
}

/// An admin's resolution of a pending rejection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Approve,
    Deny,
}

impl FromStr for Resolution {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            REJECTION_APPROVED => Ok(Resolution::Approve),
            REJECTION_DENIED => Ok(Resolution::Deny),
            other => Err(CoreError::Validation(format!(
                "Invalid rejection_status '{other}'. Must be one of: approved, denied"
            ))),
        }
    }
}

/// A single-item transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationAction {
    Decide(Decision),
    Review(ReviewDecision),
    Resolve(Resolution),
    Edit,
}

/// A bulk action over many items (`approve | reject | delete`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Approve,
    Reject,
    Delete,
}

impl BulkAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkAction::Approve => "approve",
            BulkAction::Reject => "reject",
            BulkAction::Delete => "delete",
        }
    }

    /// The per-item state a status-changing bulk action produces, or `None`
    /// for deletion.
    pub fn target_state(self) -> Option<ModerationState> {
        match self {
            BulkAction::Approve => Some(ModerationState::Approved),
            BulkAction::Reject => Some(ModerationState::Rejected),
            BulkAction::Delete => None,
        }
    }
}

impl FromStr for BulkAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(BulkAction::Approve),
            "reject" => Ok(BulkAction::Reject),
            "delete" => Ok(BulkAction::Delete),
            other => Err(CoreError::Validation(format!(
                "Invalid action '{other}'. Must be one of: approve, reject, delete"
            ))),
        }
    }
}
