pub mod admin;
pub mod auth;
pub mod community;
pub mod health;
pub mod text_guide;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree (mounted at the root, next to `/health`).
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user (requires auth)
///
/// /admin/users/{id}/role                           assign role (admin only)
///
/// /text_guide                                      submit (POST)
/// /text_guide/{id}                                 get, edit, delete
/// /get_all_guides                                  public listing
/// /all_text_guides                                 moderator listing (?status=)
/// /my_text_guides                                  own guides
/// /text_guides/rejection_requests                  outstanding requests (admin)
/// /text_guides/bulk_action                         bulk approve/reject/delete (admin)
/// /approve_or_reject/{id}                          admin decision (PUT)
/// /approve_or_reject_text_guide/{id}               support review (PUT)
/// /approve_or_deny_rejection_request/{id}          admin resolve (PUT)
///
/// /community                                       submit (POST), public listing (GET)
/// /community/{id}                                  get, edit, delete
/// /all_community                                   moderator listing (?status=)
/// /my_community                                    own posts
/// /community/rejection_requests                    outstanding requests (admin)
/// /community/bulk_action                           bulk approve/reject/delete (admin)
/// /approve_community/{id}                          admin decision (PUT)
/// /reject_community/{id}                           support review (PUT)
/// /rejection_approval/{id}                         admin resolve (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .merge(text_guide::router())
        .merge(community::router())
}
