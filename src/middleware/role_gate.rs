//! Static role-to-endpoint allowlist.
//!
//! Every protected route appears exactly once in [`ROUTE_ACCESS`]; a route
//! that is missing is denied. The gate only looks at the caller's role, never
//! at the data being touched.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthUser, Role};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any authenticated caller, whatever the role claim says
    Any,
    Roles(&'static [Role]),
}

impl Access {
    pub fn allows(&self, user: &AuthUser) -> bool {
        match self {
            Access::Any => true,
            Access::Roles(roles) => user.known_role().map_or(false, |r| roles.contains(&r)),
        }
    }
}

const PARTNER_DIRECTOR_MANAGER: Access = Access::Roles(Role::ALL);
const PARTNER_DIRECTOR: Access = Access::Roles(&[Role::Partner, Role::Director]);
const PARTNER: Access = Access::Roles(&[Role::Partner]);

/// (method, route pattern, access)
pub static ROUTE_ACCESS: &[(&str, &str, Access)] = &[
    ("GET", "/api/clients", Access::Any),
    ("POST", "/api/clients", PARTNER_DIRECTOR_MANAGER),
    ("PATCH", "/api/clients/:key", PARTNER_DIRECTOR_MANAGER),
    ("GET", "/api/proposals", Access::Any),
    ("POST", "/api/proposals", PARTNER_DIRECTOR_MANAGER),
    ("PATCH", "/api/proposals/:key", PARTNER_DIRECTOR_MANAGER),
    ("GET", "/api/assignments", Access::Any),
    ("POST", "/api/assignments", PARTNER_DIRECTOR),
    ("PATCH", "/api/assignments/:key", PARTNER_DIRECTOR),
    ("GET", "/api/invoices", PARTNER_DIRECTOR_MANAGER),
    ("POST", "/api/invoices", PARTNER_DIRECTOR),
    ("PATCH", "/api/invoices/:key", PARTNER_DIRECTOR),
    ("GET", "/api/receipts", Access::Any),
    ("POST", "/api/receipts", PARTNER_DIRECTOR),
    ("GET", "/api/export/:entity", Access::Any),
    ("GET", "/api/reports/billing", PARTNER_DIRECTOR),
    ("GET", "/api/reports/aging", PARTNER_DIRECTOR),
    ("GET", "/api/reports/proposals", Access::Any),
    ("GET", "/api/audit-logs", PARTNER_DIRECTOR),
    ("GET", "/api/users", PARTNER),
    ("PUT", "/api/users/:id/role", PARTNER),
    ("POST", "/api/upload/:entity", Access::Any),
];

/// `HEAD` is answered by the GET handler, so it shares the GET entry
pub fn access_for(method: &str, pattern: &str) -> Option<Access> {
    let method = if method == "HEAD" { "GET" } else { method };
    ROUTE_ACCESS
        .iter()
        .find(|(m, p, _)| *m == method && *p == pattern)
        .map(|(_, _, access)| *access)
}

/// Runs after `jwt_auth_middleware`; needs the `AuthUser` it attaches
pub async fn role_gate_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let pattern = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();

    let allowed = access_for(request.method().as_str(), &pattern)
        .map_or(false, |access| access.allows(&user));

    if !allowed {
        tracing::info!("Denied {} {} to {} ({})", request.method(), pattern, user.id, user.role);
        return Err(ApiError::forbidden(format!(
            "Role {} does not have access to this resource",
            user.role
        )));
    }

    Ok(next.run(request).await)
}
