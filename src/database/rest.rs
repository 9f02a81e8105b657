use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use crate::config::StoreConfig;
use crate::database::store::{SelectQuery, StoreError, TableStore};

/// Path under the project URL where tables are exposed
const REST_PREFIX: &str = "rest/v1/";

/// `TableStore` over the hosted database's REST table interface.
/// One `reqwest::Client` is shared by every request.
pub struct RestStore {
    client: Client,
    base: Url,
    service_key: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let (url, key) = match (&config.url, &config.service_key) {
            (Some(url), Some(key)) => (url, key),
            _ => return Err(StoreError::InvalidUrl("store URL or key missing".to_string())),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base: rest_base(url)?,
            service_key: key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.base
            .join(table)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", table, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn returning(request: RequestBuilder) -> RequestBuilder {
        request.header("Prefer", "return=representation")
    }
}

/// Normalize the project URL to `{url}/rest/v1/` so table names join underneath it
fn rest_base(url: &str) -> Result<Url, StoreError> {
    let mut base = Url::parse(url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(REST_PREFIX)
        .map_err(|e| StoreError::InvalidUrl(e.to_string()))
}

async fn rows(response: Response) -> Result<Vec<Value>, StoreError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(&body).map_err(|e| StoreError::Decode(e.to_string()))? {
        Value::Array(items) => Ok(items),
        obj @ Value::Object(_) => Ok(vec![obj]),
        other => Err(StoreError::Decode(format!("expected rows, got {}", other))),
    }
}

/// The table interface reports failures as `{"message": ..., "details": ...}`
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            let message = map.get("message").and_then(Value::as_str).unwrap_or("request failed");
            match map.get("details").and_then(Value::as_str) {
                Some(details) if !details.is_empty() => format!("{} ({})", message, details),
                _ => message.to_string(),
            }
        }
        _ if body.trim().is_empty() => "request failed".to_string(),
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl TableStore for RestStore {
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, StoreError> {
        let url = self.table_url(table)?;
        tracing::debug!("select {} {:?}", table, query);

        let response = self
            .authorize(self.client.get(url))
            .query(&query.to_query_pairs())
            .send()
            .await?;
        rows(response).await
    }

    async fn insert(&self, table: &str, row: Map<String, Value>) -> Result<Vec<Value>, StoreError> {
        let url = self.table_url(table)?;
        tracing::debug!("insert into {}", table);

        let response = Self::returning(self.authorize(self.client.post(url)))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&Value::Object(row))
            .send()
            .await?;
        rows(response).await
    }

    async fn update(
        &self,
        table: &str,
        column: &str,
        key: &str,
        patch: Map<String, Value>,
    ) -> Result<Vec<Value>, StoreError> {
        let url = self.table_url(table)?;
        tracing::debug!("update {} where {} = {}", table, column, key);

        let response = Self::returning(self.authorize(self.client.patch(url)))
            .query(&[(column, format!("eq.{}", key))])
            .json(&Value::Object(patch))
            .send()
            .await?;
        rows(response).await
    }
}
