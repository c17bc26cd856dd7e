//! Liveness plus a glance at the moderation queues.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use reefnet_core::content::ContentKind;
use reefnet_db::models::content::Backlog;
use reefnet_db::repositories::ContentRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database cannot be reached.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Absent while the database is down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queues: Option<ModerationQueues>,
}

#[derive(Debug, Serialize)]
pub struct ModerationQueues {
    pub text_guides: Backlog,
    pub forum_posts: Backlog,
}

async fn queues(state: &AppState) -> Result<ModerationQueues, sqlx::Error> {
    Ok(ModerationQueues {
        text_guides: ContentRepo::backlog(&state.pool, ContentKind::TextGuide).await?,
        forum_posts: ContentRepo::backlog(&state.pool, ContentKind::ForumPost).await?,
    })
}

/// GET /health
///
/// 200 while the database answers, 503 otherwise.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = match reefnet_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            false
        }
    };
    let queues = if db_healthy {
        queues(&state)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Moderation backlog query failed"))
            .ok()
    } else {
        None
    };

    let (code, status) = if db_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            queues,
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
