//! Route definitions for community forum posts.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::content::{self, ForumPosts};
use crate::state::AppState;

/// Forum post routes, mounted at the root.
///
/// `/community/rejection_requests` and `/community/bulk_action` are static
/// segments, so they take priority over `/community/{id}`.
///
/// ```text
/// POST   /community                        -> create
/// GET    /community                        -> list_public
/// GET    /all_community                    -> list_all (support, admin)
/// GET    /my_community                     -> list_mine
/// GET    /community/{id}                   -> get_one
/// PUT    /community/{id}                   -> edit (author, admin)
/// DELETE /community/{id}                   -> delete (admin)
/// GET    /community/rejection_requests     -> list_rejection_requests (admin)
/// POST   /community/bulk_action            -> bulk_action (admin)
/// PUT    /approve_community/{id}           -> decide (admin)
/// PUT    /reject_community/{id}            -> review (support, admin)
/// PUT    /rejection_approval/{id}          -> resolve (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/community",
            get(content::list_public::<ForumPosts>).post(content::create::<ForumPosts>),
        )
        .route(
            "/community/{id}",
            get(content::get_one::<ForumPosts>)
                .put(content::edit::<ForumPosts>)
                .delete(content::delete::<ForumPosts>),
        )
        .route(
            "/community/rejection_requests",
            get(content::list_rejection_requests::<ForumPosts>),
        )
        .route(
            "/community/bulk_action",
            post(content::bulk_action::<ForumPosts>),
        )
        .route("/all_community", get(content::list_all::<ForumPosts>))
        .route("/my_community", get(content::list_mine::<ForumPosts>))
        .route("/approve_community/{id}", put(content::decide::<ForumPosts>))
        .route("/reject_community/{id}", put(content::review::<ForumPosts>))
        .route(
            "/rejection_approval/{id}",
            put(content::resolve::<ForumPosts>),
        )
}
