// Generic table handlers. Each entity route instantiates these with its model
// type, so the per-entity behavior lives entirely in the `Table` impls.

use axum::extract::{Extension, Path, State};

use crate::api::ApiJson;
use crate::app::AppState;
use crate::auth::AuthUser;
use crate::database::repository::{Creatable, Patchable, Table};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/{entity} - All rows the caller's row-level policies allow
pub async fn list<E: Table>(State(state): State<AppState>) -> ApiResult<Vec<E::Row>> {
    let rows = state.repository::<E>()?.list().await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/{entity} - Create one row, 201 with the stored row
pub async fn create<E: Creatable>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(input): ApiJson<E::Create>,
) -> ApiResult<E::Row> {
    let row = state.repository::<E>()?.create(&input, &user.id).await?;
    Ok(ApiResponse::created(row))
}

/// PATCH /api/{entity}/:key - Apply only the supplied fields
pub async fn update<E: Patchable>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(key): Path<String>,
    ApiJson(patch): ApiJson<E::Update>,
) -> ApiResult<E::Row> {
    let row = state.repository::<E>()?.update(&key, &patch, &user.id).await?;
    Ok(ApiResponse::success(row))
}
