use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{ApiConfig, AppConfig, SecurityConfig};
use crate::database::models::{Assignment, Client, Invoice, Proposal, Receipt};
use crate::database::repository::{Repository, Table};
use crate::database::store::TableStore;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, role_gate_middleware};
use crate::observer::ObserverSet;
use crate::services::AuditRecorder;

/// Shared, immutable request state
#[derive(Clone)]
pub struct AppState {
    pub security: SecurityConfig,
    pub api: ApiConfig,
    /// `None` when store credentials are missing; data endpoints then answer 503
    pub store: Option<Arc<dyn TableStore>>,
    pub observers: ObserverSet,
}

impl AppState {
    pub fn new(config: &AppConfig, store: Option<Arc<dyn TableStore>>, observers: ObserverSet) -> Self {
        Self {
            security: config.security.clone(),
            api: config.api.clone(),
            store,
            observers,
        }
    }

    pub fn store(&self) -> Result<Arc<dyn TableStore>, ApiError> {
        self.store
            .clone()
            .ok_or_else(|| ApiError::service_unavailable("Data store is not configured"))
    }

    pub fn repository<E: Table>(&self) -> Result<Repository<E>, ApiError> {
        Ok(Repository::new(self.store()?, self.observers.clone()))
    }

    pub fn audit(&self) -> Result<AuditRecorder, ApiError> {
        Ok(AuditRecorder::new(self.store()?))
    }
}

pub fn router(state: AppState) -> Router {
    use protected::entities;

    let protected = Router::new()
        // Entities
        .route("/api/clients", get(entities::list::<Client>).post(entities::create::<Client>))
        .route("/api/clients/:key", patch(entities::update::<Client>))
        .route("/api/proposals", get(entities::list::<Proposal>).post(entities::create::<Proposal>))
        .route("/api/proposals/:key", patch(entities::update::<Proposal>))
        .route(
            "/api/assignments",
            get(entities::list::<Assignment>).post(entities::create::<Assignment>),
        )
        .route("/api/assignments/:key", patch(entities::update::<Assignment>))
        .route("/api/invoices", get(entities::list::<Invoice>).post(entities::create::<Invoice>))
        .route("/api/invoices/:key", patch(entities::update::<Invoice>))
        .route("/api/receipts", get(entities::list::<Receipt>).post(entities::create::<Receipt>))
        // Files
        .route("/api/export/:entity", get(protected::export::export))
        .route("/api/upload/:entity", post(protected::upload::upload))
        // Reports
        .route("/api/reports/billing", get(protected::reports::billing))
        .route("/api/reports/aging", get(protected::reports::aging))
        .route("/api/reports/proposals", get(protected::reports::proposals))
        // Administration
        .route("/api/audit-logs", get(protected::audit::recent))
        .route("/api/users", get(protected::users::list))
        .route("/api/users/:id/role", put(protected::users::update_role))
        // Layers run bottom-up: authenticate, then check the role table
        .route_layer(from_fn(role_gate_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/api/health", get(public::health::health))
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.api.max_upload_bytes))
        .layer(cors_layer(&state.security.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `*` allows every origin; an empty list allows none
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}
