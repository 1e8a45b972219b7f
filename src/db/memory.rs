use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use super::store::{ItemStore, NewItem, StoreError};
use crate::models::Item;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Item>,
    last_id: i64,
}

/// Item store kept in process memory. Backs the test suite and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryItemStore {
    table: RwLock<Table>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Item>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn create(&self, item: NewItem) -> Result<Item, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let now = Utc::now();
        let row = Item {
            id: table.last_id,
            name: item.name,
            price: item.price,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, item: NewItem) -> Result<Option<Item>, StoreError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        // updated_at must move forward even when the clock has not
        let now = Utc::now();
        let floor = row.updated_at + Duration::microseconds(1);
        row.name = item.name;
        row.price = item.price;
        row.updated_at = if now > floor { now } else { floor };
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(name: &str, price: f64) -> NewItem {
        NewItem { name: name.to_string(), price }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_never_reused() {
        let store = MemoryItemStore::new();
        let a = store.create(new_item("a", 1.0)).await.unwrap();
        let b = store.create(new_item("b", 2.0)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert!(store.delete(b.id).await.unwrap());
        let c = store.create(new_item("c", 3.0)).await.unwrap();
        assert_eq!(c.id, 3);

        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn update_keeps_identity_and_advances_updated_at() {
        let store = MemoryItemStore::new();
        let created = store.create(new_item("Widget", 9.99)).await.unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let updated = store.update(created.id, new_item("Widget2", 12.5)).await.unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.name, "Widget2");
        assert_eq!(updated.price, 12.5);

        let again = store.update(created.id, new_item("Widget3", 1.0)).await.unwrap().unwrap();
        assert!(again.updated_at > updated.updated_at);
    }

    #[tokio::test]
    async fn missing_rows_are_not_errors() {
        let store = MemoryItemStore::new();
        assert!(store.get(42).await.unwrap().is_none());
        assert!(store.update(42, new_item("x", 1.0)).await.unwrap().is_none());
        assert!(!store.delete(42).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }
}
