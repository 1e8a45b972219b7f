use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use super::store::{ItemStore, NewItem, StoreError};
use crate::models::Item;

const CREATE_ITEMS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

/// Connection pool sizing
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Item store backed by a PostgreSQL table
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    /// Connect to the database and make sure the `items` table exists.
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    /// * `settings` - Pool sizing and acquire timeout
    pub async fn connect(database_url: &str, settings: PoolSettings) -> Result<Self, StoreError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(Duration::from_secs(600)) // Close idle connections after 10 minutes
            .max_lifetime(Duration::from_secs(1800)) // Recycle connections after 30 minutes
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create or upgrade the schema
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_ITEMS_TABLE).execute(&self.pool).await?;
        info!("Schema for table 'items' is in place");
        Ok(())
    }

    fn log_pool(&self, op: &str) {
        let pool_idle = self.pool.num_idle() as u32;
        let pool_size = self.pool.size();
        debug!(
            "{} items. Pool connections: {} idle, {} in use",
            op,
            pool_idle,
            pool_size.saturating_sub(pool_idle)
        );
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.log_pool("Listing");
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, created_at, updated_at FROM items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn get(&self, id: i64) -> Result<Option<Item>, StoreError> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, created_at, updated_at FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn create(&self, item: NewItem) -> Result<Item, StoreError> {
        self.log_pool("Inserting");
        let created = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, price)
            VALUES ($1, $2)
            RETURNING id, name, price, created_at, updated_at
            "#,
        )
        .bind(&item.name)
        .bind(item.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, id: i64, item: NewItem) -> Result<Option<Item>, StoreError> {
        // now() is the transaction start, so bump past the previous value when they collide
        let updated = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET name = $1,
                price = $2,
                updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
            WHERE id = $3
            RETURNING id, name, price, created_at, updated_at
            "#,
        )
        .bind(&item.name)
        .bind(item.price)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Needs a reachable database: `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn crud_against_postgres() {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set");
        let store = PgItemStore::connect(&url, PoolSettings::default()).await.unwrap();
        // Running the migration twice is harmless
        store.migrate().await.unwrap();

        let created = store
            .create(NewItem { name: "Widget".into(), price: 9.99 })
            .await
            .unwrap();
        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Widget");
        assert_eq!(fetched.price, 9.99);

        let updated = store
            .update(created.id, NewItem { name: "Widget2".into(), price: 12.5 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        assert!(store.list().await.unwrap().iter().any(|i| i.id == created.id));
        assert!(store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());
        assert!(!store.delete(created.id).await.unwrap());
    }
}
