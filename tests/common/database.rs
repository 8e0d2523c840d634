//! Database test fixtures and utilities
//!
//! PostgreSQL tests run only when `DATABASE_URL` is set. They share one
//! database, so they are serialized with `serial_test` and truncate the
//! tables before running.

use sqlx::PgPool;
use xpcollab::backend::store::PgStore;

/// Test database connection pool, or `None` when `DATABASE_URL` is unset
pub async fn create_test_pool() -> Option<PgPool> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    Some(
        PgPool::connect(&database_url)
            .await
            .expect("Failed to create test database pool"),
    )
}

/// Remove all experiment data while preserving the schema
pub async fn cleanup_test_data(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("TRUNCATE TABLE experiment_versions, experiments CASCADE")
        .execute(pool)
        .await?;
    Ok(())
}

/// Test database fixture: a migrated, empty store
pub struct TestDatabase {
    store: PgStore,
}

impl TestDatabase {
    /// `None` when no test database is configured
    pub async fn new() -> Option<Self> {
        let pool = create_test_pool().await?;
        let store = PgStore::new(pool);
        store.migrate().await.expect("Failed to run migrations");
        cleanup_test_data(store.pool())
            .await
            .expect("Failed to clean test data");
        Some(Self { store })
    }

    pub fn store(&self) -> PgStore {
        self.store.clone()
    }

    pub fn pool(&self) -> &PgPool {
        self.store.pool()
    }
}
