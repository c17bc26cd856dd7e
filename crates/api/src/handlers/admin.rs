//! Handlers for the `/admin` resource (role assignment).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::State;
use axum::Json;
use reefnet_core::error::CoreError;
use reefnet_core::roles::Role;
use reefnet_core::types::DbId;
use reefnet_db::models::user::UserResponse;
use reefnet_db::repositories::UserRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role: String,
}

/// PUT /admin/users/{id}/role
///
/// Assign `user`, `support` or `admin` to an account. The new role shows up
/// in the user's next access token.
pub async fn assign_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(user_id): AppPath<DbId>,
    AppJson(input): AppJson<AssignRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role: Role = input.role.trim().parse()?;

    let user = UserRepo::set_role(&state.pool, user_id, role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id,
        role = %role,
        "User role updated"
    );

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
