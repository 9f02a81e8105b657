// Post-commit observers
//
// Repositories emit a `CommitEvent` after the store confirms a write.
// Observers run after the fact: the write is already durable and its result
// goes back to the caller whatever an observer does. An observer error is
// logged at warn level and dropped here, in one place; that is the whole
// failure policy for audit logging.

pub mod audit;
pub mod error;

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::Operation;

pub use audit::AuditObserver;
pub use error::ObserverError;

/// A successful single-row write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    pub operation: Operation,
    pub actor_id: String,
    pub entity_type: &'static str,
    pub entity_id: String,
    pub detail: Option<String>,
}

#[async_trait]
pub trait CommitObserver: Send + Sync {
    /// Observer name for logging
    fn name(&self) -> &'static str;

    async fn on_commit(&self, event: &CommitEvent) -> Result<(), ObserverError>;
}

/// The observers a repository reports to. Cheap to clone.
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Arc<Vec<Arc<dyn CommitObserver>>>,
}

impl ObserverSet {
    pub fn new(observers: Vec<Arc<dyn CommitObserver>>) -> Self {
        Self { observers: Arc::new(observers) }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Run every observer; failures are logged and swallowed
    pub async fn notify(&self, event: &CommitEvent) {
        let runs = self.observers.iter().map(|observer| async move {
            if let Err(e) = observer.on_commit(event).await {
                tracing::warn!(
                    "Observer '{}' failed for {} {} {}: {}",
                    observer.name(),
                    event.operation,
                    event.entity_type,
                    event.entity_id,
                    e
                );
            }
        });
        futures::future::join_all(runs).await;
    }
}
