use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Operation;

pub const AUDIT_TABLE: &str = "audit_logs";

/// A stored audit row. Append-only: this service never updates or deletes one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAuditLogEntry {
    pub user_id: String,
    pub action: Operation,
    pub entity_type: String,
    pub entity_id: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}
