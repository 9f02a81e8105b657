use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/health - Liveness probe, no authentication
///
/// Always 200 while the process is up. `store_configured` is false when
/// the data endpoints would answer 503.
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "store_configured": state.store.is_some(),
    })))
}
