//! Handlers for moderated content (text guides and community forum posts).
//!
//! Both resources share one contract, so every handler is generic over a
//! [`ContentResource`] marker that selects the [`ContentKind`]. Routes pick
//! the marker, e.g. `post(content::create::<TextGuides>)`.
//!
//! Single-item transitions lock the row, evaluate the transition through
//! [`ModerationState::apply`] and persist all moderation columns in one
//! statement, all inside one transaction.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use reefnet_core::content::{validate_bulk_ids, validate_content, validate_title, ContentKind};
use reefnet_core::error::CoreError;
use reefnet_core::moderation::{
    BulkAction, ContentStatus, Decision, ModerationAction, ModerationState, Resolution,
    ReviewDecision,
};
use reefnet_core::policy::{self, Actor, Ownership, Permission};
use reefnet_core::types::DbId;
use reefnet_db::models::content::{
    ContentItem, ContentView, CreateContent, PublicContentItem, UpdateContent,
};
use reefnet_db::repositories::content_repo::ContentFilter;
use reefnet_db::repositories::ContentRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireModerator};
use crate::query::{ContentListParams, PaginationParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Resource markers
// ---------------------------------------------------------------------------

/// Selects which content table a generic handler operates on.
pub trait ContentResource: Send + Sync + 'static {
    const KIND: ContentKind;
}

/// `/text_guide...` routes.
pub struct TextGuides;

impl ContentResource for TextGuides {
    const KIND: ContentKind = ContentKind::TextGuide;
}

/// `/community...` routes.
pub struct ForumPosts;

impl ContentResource for ForumPosts {
    const KIND: ContentKind = ContentKind::ForumPost;
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body for create and edit: `{title, content}`.
#[derive(Debug, Deserialize)]
pub struct ContentInput {
    pub title: String,
    pub content: String,
}

/// Admin decision body: `{"status": "approved" | "rejected"}`.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub status: String,
}

/// Support review body: `{"status": ..., "rejection_justification": ...}`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: String,
    pub rejection_justification: Option<String>,
}

/// Admin resolution body: `{"rejection_status": "approved" | "denied"}`.
#[derive(Debug, Deserialize)]
pub struct ResolutionRequest {
    pub rejection_status: String,
}

/// Bulk action body. Text guides send `guide_ids`, forum posts `post_ids`.
#[derive(Debug, Deserialize)]
pub struct BulkActionRequest {
    #[serde(alias = "guide_ids", alias = "post_ids")]
    pub ids: Vec<DbId>,
    pub action: String,
}

/// Outcome of a bulk action.
#[derive(Debug, Serialize)]
pub struct BulkActionResult {
    pub action: BulkAction,
    /// Distinct ids in the request.
    pub requested: usize,
    /// Rows actually updated or deleted.
    pub affected: usize,
    /// The affected ids, ascending.
    pub ids: Vec<DbId>,
    /// Requested ids that did not exist.
    pub missing: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Submission and reads
// ---------------------------------------------------------------------------

/// POST /text_guide, POST /community
///
/// Submit a new item. Admin submissions are published immediately; everyone
/// else's start pending.
pub async fn create<R: ContentResource>(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<ContentInput>,
) -> AppResult<(StatusCode, Json<DataResponse<ContentItem>>)> {
    let actor = auth.actor();
    policy::require(&actor, Permission::Submit, Ownership::None)?;
    validate_title(&input.title)?;
    validate_content(&input.content)?;

    let initial = ModerationState::initial(&actor);
    let item = ContentRepo::create(
        &state.pool,
        R::KIND,
        &CreateContent {
            author_id: auth.user_id,
            title: input.title.trim().to_string(),
            content: input.content,
        },
        &initial,
    )
    .await?;

    tracing::info!(
        kind = %R::KIND,
        item_id = item.id,
        user_id = auth.user_id,
        status = %initial.status(),
        "Content submitted"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// GET /get_all_guides, GET /community
///
/// Public listing: approved items only.
pub async fn list_public<R: ContentResource>(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PublicContentItem>>>> {
    let filter = ContentFilter {
        limit: params.limit,
        offset: params.offset,
        ..ContentFilter::public()
    };
    let items = ContentRepo::list(&state.pool, R::KIND, &filter).await?;
    Ok(Json(DataResponse {
        data: items.iter().map(PublicContentItem::from).collect(),
    }))
}

/// GET /all_text_guides, GET /all_community
///
/// Moderator listing of every item, optionally filtered by `?status=`.
pub async fn list_all<R: ContentResource>(
    RequireModerator(_moderator): RequireModerator,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ContentListParams>,
) -> AppResult<Json<DataResponse<Vec<ContentItem>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<ContentStatus>)
        .transpose()?;

    let filter = ContentFilter {
        status: status.map(|s| s.as_str().to_string()),
        author_id: None,
        limit: params.limit,
        offset: params.offset,
    };
    let items = ContentRepo::list(&state.pool, R::KIND, &filter).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /my_text_guides, GET /my_community
///
/// The caller's own items in every status.
pub async fn list_mine<R: ContentResource>(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ContentItem>>>> {
    let filter = ContentFilter {
        status: None,
        author_id: Some(auth.user_id),
        limit: params.limit,
        offset: params.offset,
    };
    let items = ContentRepo::list(&state.pool, R::KIND, &filter).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /text_guide/{id}, GET /community/{id}
///
/// Approved items are public. Anything else is visible only to its author
/// and moderators; other callers get 404 so unpublished ids do not leak.
/// Only the author and moderators see the rejection-request columns.
pub async fn get_one<R: ContentResource>(
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<ContentView>>> {
    let item = ContentRepo::find_by_id(&state.pool, R::KIND, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;

    let privileged =
        auth.is_some_and(|a| policy::can_view_unpublished(&a.actor(), item.author_id));
    let view = if privileged {
        ContentView::Full(item)
    } else if item.moderation_state()?.is_public() {
        ContentView::Public(PublicContentItem::from(&item))
    } else {
        return Err(not_found::<R>(id));
    };

    Ok(Json(DataResponse { data: view }))
}

/// GET /text_guides/rejection_requests, GET /community/rejection_requests
///
/// Items with an outstanding rejection request, oldest first.
pub async fn list_rejection_requests<R: ContentResource>(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ContentItem>>>> {
    let items = ContentRepo::list_pending_rejection_requests(
        &state.pool,
        R::KIND,
        params.limit,
        params.offset,
    )
    .await?;
    Ok(Json(DataResponse { data: items }))
}

// ---------------------------------------------------------------------------
// Moderation transitions
// ---------------------------------------------------------------------------

/// PUT /approve_or_reject/{id}, PUT /approve_community/{id}
///
/// Admin decision. Allowed from any state; clears any rejection request.
pub async fn decide<R: ContentResource>(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<DecisionRequest>,
) -> AppResult<Json<DataResponse<ContentItem>>> {
    let actor = auth.actor();
    policy::require(&actor, Permission::Decide, Ownership::None)?;
    let decision: Decision = input.status.parse()?;

    let item = transition::<R>(&state, &actor, id, ModerationAction::Decide(decision)).await?;

    tracing::info!(
        kind = %R::KIND,
        item_id = id,
        user_id = auth.user_id,
        status = %item.status,
        "Content decided by admin"
    );

    Ok(Json(DataResponse { data: item }))
}

/// PUT /approve_or_reject_text_guide/{id}, PUT /reject_community/{id}
///
/// Support review of a published item: re-approve it, or file a rejection
/// request with a justification for an admin to resolve.
pub async fn review<R: ContentResource>(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ReviewRequest>,
) -> AppResult<Json<DataResponse<ContentItem>>> {
    let actor = auth.actor();
    policy::require(&actor, Permission::Review, Ownership::None)?;
    let review = ReviewDecision::from_request(&input.status, input.rejection_justification)?;

    let item = transition::<R>(&state, &actor, id, ModerationAction::Review(review)).await?;

    tracing::info!(
        kind = %R::KIND,
        item_id = id,
        user_id = auth.user_id,
        status = %item.status,
        rejection_status = ?item.rejection_status,
        "Content reviewed by support"
    );

    Ok(Json(DataResponse { data: item }))
}

/// PUT /approve_or_deny_rejection_request/{id}, PUT /rejection_approval/{id}
///
/// Admin resolution of a pending rejection request.
pub async fn resolve<R: ContentResource>(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ResolutionRequest>,
) -> AppResult<Json<DataResponse<ContentItem>>> {
    let actor = auth.actor();
    policy::require(&actor, Permission::ResolveRejectionRequest, Ownership::None)?;
    let resolution: Resolution = input.rejection_status.parse()?;

    let item = transition::<R>(&state, &actor, id, ModerationAction::Resolve(resolution)).await?;

    tracing::info!(
        kind = %R::KIND,
        item_id = id,
        user_id = auth.user_id,
        status = %item.status,
        rejection_status = ?item.rejection_status,
        "Rejection request resolved"
    );

    Ok(Json(DataResponse { data: item }))
}

/// PUT /text_guide/{id}, PUT /community/{id}
///
/// Replace title and body. An admin edit publishes the item; an author edit
/// sends it back to pending.
pub async fn edit<R: ContentResource>(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ContentInput>,
) -> AppResult<Json<DataResponse<ContentItem>>> {
    let actor = auth.actor();
    let mut tx = state.pool.begin().await?;

    let current = ContentRepo::find_for_update(&mut *tx, R::KIND, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;

    policy::require(&actor, Permission::Edit, Ownership::Author(current.author_id))?;
    validate_title(&input.title)?;
    validate_content(&input.content)?;

    let next = current
        .moderation_state()?
        .apply(&actor, current.author_id, ModerationAction::Edit)?;

    let update = UpdateContent {
        title: input.title.trim().to_string(),
        content: input.content,
    };
    let item = ContentRepo::save_edit(&mut *tx, R::KIND, id, &update, &next)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    tx.commit().await?;

    tracing::info!(
        kind = %R::KIND,
        item_id = id,
        user_id = auth.user_id,
        status = %item.status,
        "Content edited"
    );

    Ok(Json(DataResponse { data: item }))
}

/// DELETE /text_guide/{id}, DELETE /community/{id}
///
/// Hard delete. Admin only. Returns 204 No Content.
pub async fn delete<R: ContentResource>(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    policy::require(&auth.actor(), Permission::Delete, Ownership::None)?;

    if !ContentRepo::delete(&state.pool, R::KIND, id).await? {
        return Err(not_found::<R>(id));
    }

    tracing::info!(kind = %R::KIND, item_id = id, user_id = auth.user_id, "Content deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /text_guides/bulk_action, POST /community/bulk_action
///
/// Approve, reject or delete many items in one transaction. Unknown ids are
/// skipped and reported; if none of the ids exist the request fails with 404.
pub async fn bulk_action<R: ContentResource>(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<BulkActionRequest>,
) -> AppResult<Json<DataResponse<BulkActionResult>>> {
    policy::require(&auth.actor(), Permission::BulkAction, Ownership::None)?;
    let action: BulkAction = input.action.parse()?;
    let requested = validate_bulk_ids(&input.ids)?;

    let mut tx = state.pool.begin().await?;

    let existing = ContentRepo::lock_existing_ids(&mut *tx, R::KIND, &requested).await?;
    if existing.is_empty() {
        return Err(AppError::NotFound(format!(
            "No {} found for the given ids",
            R::KIND.table()
        )));
    }

    let affected = match action.target_state() {
        Some(target) => {
            ContentRepo::bulk_save_moderation(&mut *tx, R::KIND, &existing, &target).await?
        }
        None => ContentRepo::bulk_delete(&mut *tx, R::KIND, &existing).await?,
    };
    tx.commit().await?;

    let missing: Vec<DbId> = requested
        .iter()
        .copied()
        .filter(|id| !affected.contains(id))
        .collect();

    tracing::info!(
        kind = %R::KIND,
        user_id = auth.user_id,
        action = action.as_str(),
        requested = requested.len(),
        affected = affected.len(),
        "Bulk moderation action applied"
    );

    Ok(Json(DataResponse {
        data: BulkActionResult {
            action,
            requested: requested.len(),
            affected: affected.len(),
            ids: affected,
            missing,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found<R: ContentResource>(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: R::KIND.entity_name(),
        id,
    })
}

/// Lock one item, apply `action`, and persist the resulting state.
async fn transition<R: ContentResource>(
    state: &AppState,
    actor: &Actor,
    id: DbId,
    action: ModerationAction,
) -> AppResult<ContentItem> {
    let mut tx = state.pool.begin().await?;

    let current = ContentRepo::find_for_update(&mut *tx, R::KIND, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;

    let next = current
        .moderation_state()?
        .apply(actor, current.author_id, action)?;

    let item = ContentRepo::save_moderation(&mut *tx, R::KIND, id, &next)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    tx.commit().await?;

    Ok(item)
}
