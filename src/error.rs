// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::api::validation::FieldErrors;
use crate::auth::AuthError;
use crate::database::repository::RepositoryError;
use crate::database::store::StoreError;
use crate::services::export_service::ExportError;
use crate::services::import_service::ImportError;

/// HTTP API error with appropriate status codes and client-friendly messages.
/// Every variant renders as `{"detail": "..."}`; validation errors add `field_errors`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<BTreeMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (store transport issues)
    BadGateway(String),

    // 503 Service Unavailable (store not configured)
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError {
                message,
                field_errors: Some(field_errors),
            } => json!({
                "detail": message,
                "field_errors": field_errors,
            }),
            _ => json!({ "detail": self.message() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<BTreeMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::validation_error(errors.to_string(), Some(errors.into_inner()))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidSecret => {
                tracing::error!("Token secret is not configured; rejecting authenticated request");
                ApiError::unauthorized("Could not validate credentials")
            }
            AuthError::InvalidToken(e) => {
                tracing::debug!("Token rejected: {}", e);
                ApiError::unauthorized("Could not validate credentials")
            }
            AuthError::MissingSubject => ApiError::unauthorized(err.to_string()),
            AuthError::TokenGeneration(msg) => ApiError::internal_server_error(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected { status, message } if status < 500 => {
                ApiError::bad_request(message)
            }
            StoreError::Rejected { status, message } => {
                tracing::error!("Store failed with {}: {}", status, message);
                ApiError::bad_gateway("The data store could not process the request")
            }
            StoreError::Transport(e) => {
                tracing::error!("Store transport error: {}", e);
                ApiError::bad_gateway("The data store is unreachable")
            }
            StoreError::InvalidUrl(msg) => {
                tracing::error!("Store URL is invalid: {}", msg);
                ApiError::service_unavailable("Data store is not configured")
            }
            StoreError::Decode(msg) => {
                tracing::error!("Store response could not be decoded: {}", msg);
                ApiError::bad_gateway("Unexpected response from the data store")
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(errors) => errors.into(),
            RepositoryError::NotFound { entity_type, key } => {
                ApiError::not_found(format!("{} '{}' not found", entity_type, key))
            }
            RepositoryError::Store(e) => e.into(),
            RepositoryError::EmptyResponse { table } => {
                tracing::error!("Store returned no row for write to '{}'", table);
                ApiError::bad_gateway("The data store did not confirm the write")
            }
            RepositoryError::Decode { table, source } => {
                tracing::error!("Row from '{}' did not match the expected shape: {}", table, source);
                ApiError::bad_gateway("Unexpected response from the data store")
            }
            RepositoryError::Wire(e) => {
                tracing::error!("Payload serialization error: {}", e);
                ApiError::internal_server_error("Failed to encode request for the data store")
            }
        }
    }
}

impl From<ImportError> for ApiError {
    // Every bulk-upload failure is a client error
    fn from(err: ImportError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnknownEntity(_) | ExportError::UnknownFormat(_) => {
                ApiError::bad_request(err.to_string())
            }
            other => {
                tracing::error!("Export failed: {}", other);
                ApiError::internal_server_error("Failed to build export file")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_uses_detail_key() {
        let err = ApiError::forbidden("Role MANAGER does not have access to this resource");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_json(),
            json!({ "detail": "Role MANAGER does not have access to this resource" })
        );
    }

    #[test]
    fn validation_errors_carry_field_detail() {
        let mut errors = FieldErrors::default();
        errors.add("end_date", "end_date must be >= start_date");
        let err: ApiError = errors.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.to_json();
        assert_eq!(body["field_errors"]["end_date"], "end_date must be >= start_date");
        assert!(body["detail"].as_str().unwrap().contains("end_date"));
    }

    #[test]
    fn store_rejections_map_by_status() {
        let client_side: ApiError = StoreError::Rejected {
            status: 409,
            message: "duplicate key value violates unique constraint".into(),
        }
        .into();
        assert_eq!(client_side.status_code(), StatusCode::BAD_REQUEST);
        assert!(client_side.message().contains("duplicate key"));

        let server_side: ApiError = StoreError::Rejected { status: 500, message: "boom".into() }.into();
        assert_eq!(server_side.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_rows_are_404() {
        let err: ApiError = RepositoryError::NotFound {
            entity_type: "client",
            key: "CL0001".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "client 'CL0001' not found");
    }
}
