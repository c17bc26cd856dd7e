//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize`/plain DTOs used for inserts and updates

pub mod content;
pub mod session;
pub mod user;
