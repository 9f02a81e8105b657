//! Test doubles shared by unit and router tests.
//!
//! `MemoryStore` stands in for the hosted table store, including the bits the
//! real store does server-side: generated keys, `created_at`, unique natural
//! keys and the computed invoice total.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::auth::{issue_token, Claims};
use crate::database::store::{SelectQuery, StoreError, TableStore};
use crate::observer::{CommitEvent, CommitObserver, ObserverError, ObserverSet};

pub const TEST_SECRET: &str = "test-secret-for-router-tests";

/// Sign a one-hour token for `subject`, optionally carrying a role claim
pub fn token(subject: &str, role: Option<&str>) -> String {
    let claims = Claims::new(subject, role.map(String::from), 1);
    issue_token(&claims, TEST_SECRET).unwrap()
}

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<Map<String, Value>>>,
    sequences: HashMap<String, i64>,
    failing: HashSet<String>,
}

impl Tables {
    fn next_id(&mut self, table: &str) -> i64 {
        let seq = self.sequences.entry(table.to_string()).or_insert(0);
        *seq += 1;
        *seq
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a table's rows in insertion order
    pub fn rows(&self, table: &str) -> Vec<Value> {
        let tables = self.inner.lock().unwrap();
        tables
            .rows
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Insert rows as-is, bypassing server defaults
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.inner.lock().unwrap();
        let target = tables.rows.entry(table.to_string()).or_default();
        for row in rows {
            if let Value::Object(map) = row {
                target.push(map);
            }
        }
    }

    /// Make every later insert or update on `table` fail like an outage
    pub fn fail_writes_to(&self, table: &str) {
        self.inner.lock().unwrap().failing.insert(table.to_string());
    }
}

fn unique_column(table: &str) -> Option<&'static str> {
    match table {
        "clients" => Some("client_code"),
        "assignments" => Some("assignment_code"),
        "invoices" => Some("invoice_no"),
        _ => None,
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(x), Some(y)) => text(x).cmp(&text(y)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn decimal(row: &Map<String, Value>, column: &str, default: Decimal) -> Decimal {
    row.get(column)
        .and_then(|v| serde_json::from_value::<Decimal>(v.clone()).ok())
        .unwrap_or(default)
}

fn apply_server_defaults(tables: &mut Tables, table: &str, row: &mut Map<String, Value>) {
    match table {
        "clients" if row.get("client_code").map_or(true, Value::is_null) => {
            let code = format!("CL{:04}", tables.next_id(table));
            row.insert("client_code".into(), Value::String(code));
        }
        "proposals" => {
            row.insert("proposal_id".into(), Value::from(tables.next_id(table)));
        }
        "receipts" => {
            row.insert("receipt_id".into(), Value::from(tables.next_id(table)));
        }
        "audit_logs" => {
            row.insert("id".into(), Value::from(tables.next_id(table)));
        }
        _ => {}
    }

    if table == "invoices" {
        compute_invoice_total(row);
    }

    if !row.contains_key("created_at") {
        row.insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));
    }
}

fn compute_invoice_total(row: &mut Map<String, Value>) {
    let before = decimal(row, "amount_before_tax", Decimal::ZERO);
    let gst = decimal(row, "gst_pct", Decimal::new(1800, 2));
    let total = (before + before * gst / Decimal::ONE_HUNDRED).round_dp(2);
    if let Ok(value) = serde_json::to_value(total) {
        row.insert("amount_with_tax".into(), value);
    }
}

fn outage(table: &str) -> StoreError {
    StoreError::Rejected {
        status: 503,
        message: format!("simulated outage writing to {}", table),
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, StoreError> {
        let tables = self.inner.lock().unwrap();
        let mut rows: Vec<Map<String, Value>> = tables
            .rows
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        query
                            .filters
                            .iter()
                            .all(|(column, value)| row.get(column).map(text).as_deref() == Some(value.as_str()))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(&order.column), b.get(&order.column));
                if order.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows.into_iter().map(Value::Object).collect())
    }

    async fn insert(&self, table: &str, mut row: Map<String, Value>) -> Result<Vec<Value>, StoreError> {
        let mut tables = self.inner.lock().unwrap();
        if tables.failing.contains(table) {
            return Err(outage(table));
        }

        apply_server_defaults(&mut tables, table, &mut row);

        if let Some(column) = unique_column(table) {
            let key = row.get(column).map(text);
            let taken = tables
                .rows
                .get(table)
                .map_or(false, |rows| rows.iter().any(|r| r.get(column).map(text) == key));
            if taken {
                return Err(StoreError::Rejected {
                    status: 409,
                    message: format!("duplicate key value violates unique constraint \"{}_pkey\"", table),
                });
            }
        }

        tables.rows.entry(table.to_string()).or_default().push(row.clone());
        Ok(vec![Value::Object(row)])
    }

    async fn update(
        &self,
        table: &str,
        column: &str,
        key: &str,
        patch: Map<String, Value>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut tables = self.inner.lock().unwrap();
        if tables.failing.contains(table) {
            return Err(outage(table));
        }

        let mut updated = Vec::new();
        if let Some(rows) = tables.rows.get_mut(table) {
            for row in rows.iter_mut() {
                if row.get(column).map(text).as_deref() == Some(key) {
                    for (k, v) in &patch {
                        row.insert(k.clone(), v.clone());
                    }
                    if table == "invoices" {
                        compute_invoice_total(row);
                    }
                    updated.push(Value::Object(row.clone()));
                }
            }
        }
        Ok(updated)
    }
}

struct Recording(Arc<Mutex<Vec<CommitEvent>>>);

#[async_trait]
impl CommitObserver for Recording {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn on_commit(&self, event: &CommitEvent) -> Result<(), ObserverError> {
        self.0.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// An observer set that records every event it sees
pub fn recording_observers() -> (ObserverSet, Arc<Mutex<Vec<CommitEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let set = ObserverSet::new(vec![Arc::new(Recording(events.clone()))]);
    (set, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn invoice_total_is_computed() {
        let store = MemoryStore::new();
        let rows = store
            .insert(
                "invoices",
                object(json!({ "invoice_no": "INV-1", "amount_before_tax": 1000.0, "gst_pct": 18.0 })),
            )
            .await
            .unwrap();
        let total: Decimal = serde_json::from_value(rows[0]["amount_with_tax"].clone()).unwrap();
        assert_eq!(total, Decimal::from(1180));
    }

    #[tokio::test]
    async fn duplicate_natural_key_is_rejected() {
        let store = MemoryStore::new();
        let row = object(json!({ "assignment_code": "ASG-1" }));
        store.insert("assignments", row.clone()).await.unwrap();
        let err = store.insert("assignments", row).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 409, .. }));
    }

    #[tokio::test]
    async fn timestamps_order_chronologically() {
        let store = MemoryStore::new();
        store.seed(
            "audit_logs",
            vec![
                json!({ "id": 1, "created_at": "2025-01-01T09:00:00+05:30" }),
                json!({ "id": 2, "created_at": "2025-01-01T04:00:00+00:00" }),
            ],
        );
        let rows = store
            .select("audit_logs", &SelectQuery::all().order_desc("created_at"))
            .await
            .unwrap();
        // 09:00+05:30 is 03:30 UTC
        assert_eq!(rows[0]["id"], json!(2));
    }
}
