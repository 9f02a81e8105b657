use anyhow::Context;
use clap::Args;
use std::sync::Arc;

use crate::app::{router, AppState};
use crate::config::{self, AppConfig};
use crate::database::rest::RestStore;
use crate::database::store::TableStore;
use crate::observer::{AuditObserver, CommitObserver, ObserverSet};
use crate::services::AuditRecorder;

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT / PORTAL_API_PORT)")]
    pub port: Option<u16>,

    #[arg(long, default_value = "0.0.0.0", help = "Address to bind")]
    pub bind: String,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            port: None,
            bind: "0.0.0.0".to_string(),
        }
    }
}

/// Connect the store if credentials are present. Without them the server
/// still starts; data endpoints answer 503.
fn connect_store(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn TableStore>>> {
    if !config.store.is_configured() {
        tracing::warn!("SUPABASE_URL / SUPABASE_KEY not set; data endpoints will return 503");
        return Ok(None);
    }
    let store = RestStore::new(&config.store).context("failed to initialise store client")?;
    Ok(Some(Arc::new(store)))
}

fn observers(config: &AppConfig, store: Option<&Arc<dyn TableStore>>) -> ObserverSet {
    match store {
        Some(store) if config.security.enable_audit_logging => {
            let audit: Arc<dyn CommitObserver> = Arc::new(AuditObserver::new(AuditRecorder::new(store.clone())));
            ObserverSet::new(vec![audit])
        }
        _ => {
            tracing::info!("Audit logging disabled");
            ObserverSet::none()
        }
    }
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting KPCA portal API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if crate::is_production!() {
            tracing::error!("SUPABASE_JWT_SECRET is not set; every authenticated request will be rejected");
        } else {
            tracing::warn!("SUPABASE_JWT_SECRET is not set; every authenticated request will be rejected");
        }
    }

    let store = connect_store(config)?;
    let observers = observers(config, store.as_ref());
    let app = router(AppState::new(config, store, observers));

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("{}:{}", args.bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("KPCA portal API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
