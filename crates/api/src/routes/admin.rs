//! Route definitions for the `/admin` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// PUT /users/{id}/role -> assign_role
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{id}/role", put(admin::assign_role))
}
