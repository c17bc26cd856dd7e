//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or a `&mut PgConnection` inside a transaction)
//! as the first argument.

pub mod content_repo;
pub mod session_repo;
pub mod user_repo;

pub use content_repo::ContentRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
