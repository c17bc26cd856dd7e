//! Route definitions for text guides.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::content::{self, TextGuides};
use crate::state::AppState;

/// Text guide routes, mounted at the root.
///
/// ```text
/// POST   /text_guide                             -> create
/// GET    /get_all_guides                         -> list_public
/// GET    /all_text_guides                        -> list_all (support, admin)
/// GET    /my_text_guides                         -> list_mine
/// GET    /text_guide/{id}                        -> get_one
/// PUT    /text_guide/{id}                        -> edit (author, admin)
/// DELETE /text_guide/{id}                        -> delete (admin)
/// GET    /text_guides/rejection_requests         -> list_rejection_requests (admin)
/// POST   /text_guides/bulk_action                -> bulk_action (admin)
/// PUT    /approve_or_reject/{id}                 -> decide (admin)
/// PUT    /approve_or_reject_text_guide/{id}      -> review (support, admin)
/// PUT    /approve_or_deny_rejection_request/{id} -> resolve (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/text_guide", post(content::create::<TextGuides>))
        .route(
            "/text_guide/{id}",
            get(content::get_one::<TextGuides>)
                .put(content::edit::<TextGuides>)
                .delete(content::delete::<TextGuides>),
        )
        .route("/get_all_guides", get(content::list_public::<TextGuides>))
        .route("/all_text_guides", get(content::list_all::<TextGuides>))
        .route("/my_text_guides", get(content::list_mine::<TextGuides>))
        .route(
            "/text_guides/rejection_requests",
            get(content::list_rejection_requests::<TextGuides>),
        )
        .route(
            "/text_guides/bulk_action",
            post(content::bulk_action::<TextGuides>),
        )
        .route("/approve_or_reject/{id}", put(content::decide::<TextGuides>))
        .route(
            "/approve_or_reject_text_guide/{id}",
            put(content::review::<TextGuides>),
        )
        .route(
            "/approve_or_deny_rejection_request/{id}",
            put(content::resolve::<TextGuides>),
        )
}
