use async_trait::async_trait;

use crate::observer::{CommitEvent, CommitObserver, ObserverError};
use crate::services::audit_service::AuditRecorder;

/// Appends one audit row per committed write
pub struct AuditObserver {
    recorder: AuditRecorder,
}

impl AuditObserver {
    pub fn new(recorder: AuditRecorder) -> Self {
        Self { recorder }
    }
}

#[async_trait]
impl CommitObserver for AuditObserver {
    fn name(&self) -> &'static str {
        "audit"
    }

    async fn on_commit(&self, event: &CommitEvent) -> Result<(), ObserverError> {
        self.recorder
            .log(
                &event.actor_id,
                event.operation,
                event.entity_type,
                &event.entity_id,
                event.detail.as_deref(),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use crate::types::Operation;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn commit_becomes_audit_row() {
        let store = Arc::new(MemoryStore::new());
        let observer = AuditObserver::new(AuditRecorder::new(store.clone()));

        observer
            .on_commit(&CommitEvent {
                operation: Operation::Create,
                actor_id: "actor-9".into(),
                entity_type: "invoice",
                entity_id: "INV-1".into(),
                detail: Some("Generated invoice for assignment: ASG-1".into()),
            })
            .await
            .unwrap();

        let rows = store.rows("audit_logs");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["user_id"], json!("actor-9"));
        assert_eq!(rows[0]["action"], json!("CREATE"));
        assert_eq!(rows[0]["entity_type"], json!("invoice"));
        assert_eq!(rows[0]["entity_id"], json!("INV-1"));
    }

    #[tokio::test]
    async fn store_failure_is_reported_to_the_set() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes_to("audit_logs");
        let observer = AuditObserver::new(AuditRecorder::new(store));
        let result = observer
            .on_commit(&CommitEvent {
                operation: Operation::Update,
                actor_id: "actor".into(),
                entity_type: "client",
                entity_id: "CL0001".into(),
                detail: None,
            })
            .await;
        assert!(matches!(result, Err(ObserverError::Store(_))));
    }
}
