use chrono::Utc;
use std::sync::Arc;

use crate::api::wire;
use crate::database::models::audit_log::{AuditLogEntry, NewAuditLogEntry, AUDIT_TABLE};
use crate::database::store::{SelectQuery, StoreError, TableStore};
use crate::types::Operation;

/// Append-only access to the audit trail
#[derive(Clone)]
pub struct AuditRecorder {
    store: Arc<dyn TableStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// Insert one audit row timestamped now. Not transactional with the write it describes.
    pub async fn log(
        &self,
        actor_id: &str,
        operation: Operation,
        entity_type: &str,
        entity_id: &str,
        detail: Option<&str>,
    ) -> Result<(), StoreError> {
        let entry = NewAuditLogEntry {
            user_id: actor_id.to_string(),
            action: operation,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            details: detail.map(str::to_string),
            created_at: Utc::now(),
        };
        let row = wire::to_row(&entry).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.store.insert(AUDIT_TABLE, row).await?;
        Ok(())
    }

    /// Most recent `limit` entries, newest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, StoreError> {
        let query = SelectQuery::all().order_desc("created_at").limit(limit);
        let rows = self.store.select(AUDIT_TABLE, &query).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(|e| StoreError::Decode(e.to_string())))
            .collect()
    }
}
