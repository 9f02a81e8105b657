use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::validate_token;
use crate::error::ApiError;

/// Bearer-token authentication. On success the caller's `AuthUser` is
/// attached to the request extensions for the role gate and handlers.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(ApiError::unauthorized)?;
    let user = validate_token(token, &state.security.jwt_secret)?;

    tracing::debug!("Authenticated {} as {}", user.id, user.role);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer ...` header
fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or("Not authenticated")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("Not authenticated");
    }
    Ok(token)
}
