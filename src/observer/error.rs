use thiserror::Error;

use crate::database::store::StoreError;

/// Observer errors. Never surfaced to API callers.
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
