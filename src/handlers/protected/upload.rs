use axum::extract::{Extension, Multipart, Path, State};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::database::models::Client;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::import_service;

/// POST /api/upload/:entity - Bulk import from a CSV or Excel `file` field
///
/// The whole file is validated before anything is written. Rows are then
/// inserted one at a time; a failure part-way leaves earlier rows in place.
/// Every failure is reported as 400.
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(entity): Path<String>,
    multipart: Multipart,
) -> ApiResult<Value> {
    let repository = state.repository::<Client>()?;
    let (filename, bytes) = read_file_field(multipart).await?;

    let rows = import_service::parse_upload(&bytes, &filename)?;
    if entity != "clients" {
        return Err(ApiError::bad_request(
            "Bulk upload for this entity is not yet implemented",
        ));
    }
    let clients = import_service::validate_clients(rows)?;

    let mut created = 0usize;
    for client in &clients {
        repository
            .create(client, &user.id)
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        created += 1;
    }

    tracing::info!("Bulk upload of {} clients from '{}' by {}", created, filename, user.id);
    Ok(ApiResponse::success(json!({
        "message": format!("Successfully uploaded {} clients", created)
    })))
}

async fn read_file_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(ApiError::bad_request("Missing 'file' field in upload"))
}
