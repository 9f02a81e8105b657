use axum::extract::{Extension, Path, State};
use serde::Deserialize;

use crate::api::ApiJson;
use crate::app::AppState;
use crate::auth::{AuthUser, Role};
use crate::database::models::{Profile, RoleUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// Raw body for role changes; the role is checked here, not by serde,
/// so that a bad value gets the plain `Invalid role` message
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Option<String>,
}

/// GET /api/users - All user profiles
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Profile>> {
    let profiles = state.repository::<Profile>()?.list().await?;
    Ok(ApiResponse::success(profiles))
}

/// PUT /api/users/:id/role - Change a user's role
pub async fn update_role(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<RoleRequest>,
) -> ApiResult<Profile> {
    let role: Role = body
        .role
        .as_deref()
        .and_then(|r| r.parse().ok())
        .ok_or_else(|| ApiError::bad_request("Invalid role"))?;

    let profile = state
        .repository::<Profile>()?
        .update(&id, &RoleUpdate { role }, &user.id)
        .await?;
    Ok(ApiResponse::success(profile))
}
