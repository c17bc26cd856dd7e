//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireModerator`] -- Requires `support` or `admin`.
//!
//! Moderation transitions take a plain [`auth::AuthUser`] and leave the
//! decision to `reefnet_core::policy`.

pub mod auth;
pub mod rbac;
