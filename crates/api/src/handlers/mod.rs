//! Request handlers.
//!
//! Handlers delegate authorization to `reefnet_core::policy`, persistence to
//! the repositories in `reefnet_db`, and map errors via [`crate::error::AppError`].

pub mod admin;
pub mod auth;
pub mod content;
