pub mod models;
pub mod repository;
pub mod rest;
pub mod store;

pub use repository::{Repository, RepositoryError};
pub use rest::RestStore;
pub use store::{SelectQuery, StoreError, TableStore};
