use async_trait::async_trait;
use thiserror::Error;

use crate::models::Item;

/// Validated input for an insert or an update
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for items.
///
/// A missing row is reported as `None` (or `false` for deletes), never as an error.
/// Each call maps to a single statement against the backing store.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items, ascending by id.
    async fn list(&self) -> Result<Vec<Item>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Item>, StoreError>;

    /// Insert with a store-generated id and timestamps.
    async fn create(&self, item: NewItem) -> Result<Item, StoreError>;

    /// Overwrite name and price, refreshing `updated_at`. `created_at` is untouched.
    async fn update(&self, id: i64, item: NewItem) -> Result<Option<Item>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Round-trip to the store, used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
