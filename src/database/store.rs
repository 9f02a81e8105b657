use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from the external table store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Store response could not be decoded: {0}")]
    Decode(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// Read parameters understood by the table interface.
/// Equality filters, one ordering column and a row limit are all the API needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    pub filters: Vec<(String, String)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order { column: column.into(), descending: true });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render as query-string pairs in the table interface's filter syntax
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        for (column, value) in &self.filters {
            pairs.push((column.clone(), format!("eq.{}", value)));
        }
        if let Some(order) = &self.order {
            let direction = if order.descending { "desc" } else { "asc" };
            pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Table-level access to the hosted database.
///
/// Each call is one request: no retries, no batching, no transactions.
/// Writes return the affected rows as the store confirms them.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, StoreError>;

    async fn insert(&self, table: &str, row: Map<String, Value>) -> Result<Vec<Value>, StoreError>;

    /// Update every row where `column == key`
    async fn update(
        &self,
        table: &str,
        column: &str,
        key: &str,
        patch: Map<String, Value>,
    ) -> Result<Vec<Value>, StoreError>;
}
