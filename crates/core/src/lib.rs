//! Domain layer for the reefnet community backend.
//!
//! Pure logic with no I/O: identifiers, the shared error type, roles and the
//! capability policy, content validation, and the moderation state machine
//! used by both text guides and community forum posts.

pub mod content;
pub mod error;
pub mod moderation;
pub mod policy;
pub mod roles;
pub mod types;
