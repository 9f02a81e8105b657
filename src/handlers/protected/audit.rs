use axum::extract::{Query, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::AuditLogEntry;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

/// GET /api/audit-logs?limit=N - Newest audit rows first
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Vec<AuditLogEntry>> {
    let limit = query
        .limit
        .unwrap_or(state.api.audit_default_limit)
        .min(state.api.audit_max_limit);
    let entries = state.audit()?.recent(limit).await?;
    Ok(ApiResponse::success(entries))
}
