use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

use crate::api::validation::{FieldErrors, Validate};
use crate::api::wire;
use crate::database::store::{SelectQuery, StoreError, TableStore};
use crate::observer::{CommitEvent, ObserverSet};
use crate::types::Operation;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),

    #[error("{entity_type} '{key}' not found")]
    NotFound { entity_type: &'static str, key: String },

    #[error("Store returned no row for write to '{table}'")]
    EmptyResponse { table: &'static str },

    #[error("Row from '{table}' has unexpected shape: {source}")]
    Decode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode payload: {0}")]
    Wire(serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A table the API reads, keyed by a natural key
pub trait Table: Send + Sync + 'static {
    const TABLE: &'static str;
    /// Singular name used in audit rows and messages
    const ENTITY_TYPE: &'static str;
    const KEY_COLUMN: &'static str;

    type Row: DeserializeOwned + Serialize + Send + Sync;

    fn natural_key(row: &Self::Row) -> String;
}

/// Tables that accept single-row creates through the API
pub trait Creatable: Table {
    type Create: Serialize + DeserializeOwned + Validate + Send + Sync;

    /// Human-readable audit detail for a freshly inserted row
    fn created_summary(row: &Self::Row) -> String;
}

/// Tables that accept partial updates through the API
pub trait Patchable: Table {
    type Update: Serialize + DeserializeOwned + Validate + Send + Sync;

    fn updated_summary(key: &str, _patch: &Self::Update) -> String {
        format!("Updated {}: {}", Self::ENTITY_TYPE, key)
    }

    /// Whether `check_against_current` needs the stored row for this patch
    fn needs_current(_patch: &Self::Update) -> bool {
        false
    }

    /// Cross-field rules that span the patch and the stored row
    fn check_against_current(_current: &Self::Row, _patch: &Self::Update) -> Result<(), FieldErrors> {
        Ok(())
    }
}

/// Typed access to one table.
///
/// Successful writes are reported to the commit observers; what they do with
/// the event (and with their own failures) is their concern, not the caller's.
pub struct Repository<E: Table> {
    store: Arc<dyn TableStore>,
    observers: ObserverSet,
    _phantom: PhantomData<E>,
}

impl<E: Table> Repository<E> {
    pub fn new(store: Arc<dyn TableStore>, observers: ObserverSet) -> Self {
        Self {
            store,
            observers,
            _phantom: PhantomData,
        }
    }

    /// Full-table read. Row visibility is decided by the store's row-level policies.
    pub async fn list(&self) -> Result<Vec<E::Row>, RepositoryError> {
        self.select(&SelectQuery::all()).await
    }

    pub async fn select(&self, query: &SelectQuery) -> Result<Vec<E::Row>, RepositoryError> {
        let rows = self.store.select(E::TABLE, query).await?;
        rows.into_iter().map(decode::<E>).collect()
    }

    /// The row whose natural key is `key`, if any
    pub async fn find(&self, key: &str) -> Result<Option<E::Row>, RepositoryError> {
        let rows = self.select(&SelectQuery::all().eq(E::KEY_COLUMN, key).limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Raw rows, for callers that only reformat them (exports)
    pub async fn list_values(&self) -> Result<Vec<Value>, RepositoryError> {
        Ok(self.store.select(E::TABLE, &SelectQuery::all()).await?)
    }
}

impl<E: Creatable> Repository<E> {
    /// Validate, insert one row stamped with the actor, and return the row as stored
    pub async fn create(&self, input: &E::Create, actor_id: &str) -> Result<E::Row, RepositoryError> {
        input.validate()?;

        let row = wire::to_insert_row(input, actor_id).map_err(RepositoryError::Wire)?;
        let inserted = self.store.insert(E::TABLE, row).await?;
        let first = inserted
            .into_iter()
            .next()
            .ok_or(RepositoryError::EmptyResponse { table: E::TABLE })?;
        let record = decode::<E>(first)?;

        let key = E::natural_key(&record);
        tracing::info!("{} {} created by {}", E::ENTITY_TYPE, key, actor_id);

        self.observers
            .notify(&CommitEvent {
                operation: Operation::Create,
                actor_id: actor_id.to_string(),
                entity_type: E::ENTITY_TYPE,
                entity_id: key,
                detail: Some(E::created_summary(&record)),
            })
            .await;

        Ok(record)
    }
}

impl<E: Patchable> Repository<E> {
    /// Send only the supplied fields to the row matching `key`
    pub async fn update(
        &self,
        key: &str,
        patch: &E::Update,
        actor_id: &str,
    ) -> Result<E::Row, RepositoryError> {
        patch.validate()?;

        let changes = wire::to_row(patch).map_err(RepositoryError::Wire)?;
        if changes.is_empty() {
            let mut errors = FieldErrors::default();
            errors.add("body", "no fields to update");
            return Err(errors.into());
        }

        if E::needs_current(patch) {
            let current = self.find(key).await?.ok_or_else(|| RepositoryError::NotFound {
                entity_type: E::ENTITY_TYPE,
                key: key.to_string(),
            })?;
            E::check_against_current(&current, patch)?;
        }

        let updated = self.store.update(E::TABLE, E::KEY_COLUMN, key, changes).await?;
        let first = updated.into_iter().next().ok_or_else(|| RepositoryError::NotFound {
            entity_type: E::ENTITY_TYPE,
            key: key.to_string(),
        })?;
        let record = decode::<E>(first)?;

        tracing::info!("{} {} updated by {}", E::ENTITY_TYPE, key, actor_id);

        self.observers
            .notify(&CommitEvent {
                operation: Operation::Update,
                actor_id: actor_id.to_string(),
                entity_type: E::ENTITY_TYPE,
                entity_id: E::natural_key(&record),
                detail: Some(E::updated_summary(key, patch)),
            })
            .await;

        Ok(record)
    }
}

fn decode<E: Table>(value: Value) -> Result<E::Row, RepositoryError> {
    serde_json::from_value(value).map_err(|source| RepositoryError::Decode {
        table: E::TABLE,
        source,
    })
}
