use axum::{
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{Assignment, Client, Invoice, Proposal, Receipt};
use crate::error::ApiError;
use crate::services::export_service::{self, ExportEntity, ExportFormat};

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// GET /api/export/:entity?format=xlsx|csv - Download a table as a file
pub async fn export(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let entity: ExportEntity = entity.parse()?;
    let format: ExportFormat = match query.format.as_deref() {
        Some(f) => f.parse()?,
        None => ExportFormat::default(),
    };

    let rows = match entity {
        ExportEntity::Clients => state.repository::<Client>()?.list_values().await?,
        ExportEntity::Proposals => state.repository::<Proposal>()?.list_values().await?,
        ExportEntity::Assignments => state.repository::<Assignment>()?.list_values().await?,
        ExportEntity::Invoices => state.repository::<Invoice>()?.list_values().await?,
        ExportEntity::Receipts => state.repository::<Receipt>()?.list_values().await?,
    };

    let file = export_service::export(entity, format, &rows)?;
    tracing::info!("Exported {} {} rows as {}", rows.len(), entity.as_str(), format.extension());

    Ok((
        [
            (CONTENT_TYPE, file.content_type.to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file.filename)),
        ],
        file.bytes,
    )
        .into_response())
}
