//! PostgreSQL experiment store
//!
//! The exclusive lease of `StoreTransaction::lock_experiment` is a
//! `SELECT ... FOR UPDATE` on the experiment row. It serializes writers of the
//! same experiment and leaves other experiments untouched.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use super::{ExperimentStore, StoreError, StoreResult, StoreTransaction};
use crate::shared::{Experiment, ExperimentSummary, ExperimentView, ListFilter, Version};

const EXPERIMENT_COLUMNS: &str = "e.id, e.title, e.created_by, e.updated_by, e.current_version_id, \
     e.current_version_number, e.is_deleted, e.created_at, e.updated_at";

const VERSION_COLUMNS: &str = "ev.id, ev.experiment_id, ev.version_number, ev.title, ev.content, \
     ev.html_content, ev.commit_message, ev.created_by, ev.created_at";

/// Experiment store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a bounded pool
    pub async fn connect(
        options: PgConnectOptions,
        max_connections: u32,
        idle_timeout: Duration,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(idle_timeout)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn experiment_from_row(row: &PgRow) -> Result<Experiment, sqlx::Error> {
    Ok(Experiment {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        current_version_id: row.try_get("current_version_id")?,
        current_version_number: row.try_get("current_version_number")?,
        is_deleted: row.try_get("is_deleted")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn version_from_row(row: &PgRow) -> Result<Version, sqlx::Error> {
    let content: Json<Value> = row.try_get("content")?;
    Ok(Version {
        id: row.try_get("id")?,
        experiment_id: row.try_get("experiment_id")?,
        version_number: row.try_get("version_number")?,
        title: row.try_get("title")?,
        content: content.0,
        html_content: row.try_get("html_content")?,
        commit_message: row.try_get("commit_message")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}

fn view_from_row(row: &PgRow) -> Result<ExperimentView, sqlx::Error> {
    let content: Json<Value> = row.try_get("content")?;
    Ok(ExperimentView {
        experiment: experiment_from_row(row)?,
        version_number: row.try_get("version_number")?,
        version_title: row.try_get("version_title")?,
        content: content.0,
        html_content: row.try_get("html_content")?,
        commit_message: row.try_get("commit_message")?,
        version_created_at: row.try_get("version_created_at")?,
    })
}

fn summary_from_row(row: &PgRow) -> Result<ExperimentSummary, sqlx::Error> {
    let content: Option<Json<Value>> = row.try_get("content")?;
    Ok(ExperimentSummary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        created_by: row.try_get("created_by")?,
        current_version_id: row.try_get("current_version_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        version_number: row.try_get("version_number")?,
        version_title: row.try_get("version_title")?,
        content: content.map(|c| c.0),
        version_created_at: row.try_get("version_created_at")?,
    })
}

fn insert_version_error(err: sqlx::Error, version: &Version) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateVersion {
                experiment_id: version.experiment_id,
                version_number: version.version_number,
            };
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::MissingExperiment(version.experiment_id);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl ExperimentStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTransaction { tx }))
    }

    async fn find_experiment(&self, experiment_id: Uuid) -> StoreResult<Option<ExperimentView>> {
        let sql = format!(
            r#"
            SELECT {EXPERIMENT_COLUMNS},
                   ev.version_number,
                   ev.title AS version_title,
                   ev.content,
                   ev.html_content,
                   ev.commit_message,
                   ev.created_at AS version_created_at
            FROM experiments e
            JOIN experiment_versions ev ON ev.id = e.current_version_id
            WHERE e.id = $1 AND e.is_deleted = FALSE
            "#
        );
        let row = sqlx::query(&sql)
            .bind(experiment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(view_from_row).transpose()?)
    }

    async fn list_experiments(&self, filter: &ListFilter) -> StoreResult<Vec<ExperimentSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.title, e.created_by, e.current_version_id, e.created_at, e.updated_at,
                   ev.version_number,
                   ev.title AS version_title,
                   ev.content,
                   ev.created_at AS version_created_at
            FROM experiments e
            LEFT JOIN experiment_versions ev ON ev.id = e.current_version_id
            WHERE e.is_deleted = FALSE
              AND ($1::TEXT IS NULL OR e.title ILIKE $1 ESCAPE '\')
            ORDER BY e.updated_at DESC, e.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.like_pattern())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(summary_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_version(
        &self,
        experiment_id: Uuid,
        version_id: Uuid,
    ) -> StoreResult<Option<Version>> {
        let sql = format!(
            r#"
            SELECT {VERSION_COLUMNS}
            FROM experiment_versions ev
            JOIN experiments e ON e.id = ev.experiment_id
            WHERE ev.id = $1 AND ev.experiment_id = $2 AND e.is_deleted = FALSE
            "#
        );
        let row = sqlx::query(&sql)
            .bind(version_id)
            .bind(experiment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(version_from_row).transpose()?)
    }

    async fn list_versions(
        &self,
        experiment_id: Uuid,
        filter: &ListFilter,
    ) -> StoreResult<Vec<Version>> {
        let sql = format!(
            r#"
            SELECT {VERSION_COLUMNS}
            FROM experiment_versions ev
            WHERE ev.experiment_id = $1
              AND ($2::TEXT IS NULL OR ev.title ILIKE $2 ESCAPE '\')
            ORDER BY ev.version_number DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(experiment_id)
            .bind(filter.like_pattern())
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(version_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Open PostgreSQL transaction; rolled back by sqlx when dropped uncommitted
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn lock_experiment(&mut self, experiment_id: Uuid) -> StoreResult<Option<Experiment>> {
        let sql = format!("SELECT {EXPERIMENT_COLUMNS} FROM experiments e WHERE e.id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(experiment_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.as_ref().map(experiment_from_row).transpose()?)
    }

    async fn insert_experiment(&mut self, experiment: &Experiment) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO experiments (id, title, created_by, updated_by, current_version_id,
                                     current_version_number, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(experiment.id)
        .bind(&experiment.title)
        .bind(&experiment.created_by)
        .bind(&experiment.updated_by)
        .bind(experiment.current_version_id)
        .bind(experiment.current_version_number)
        .bind(experiment.is_deleted)
        .bind(experiment.created_at)
        .bind(experiment.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_version(&mut self, version: &Version) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO experiment_versions (id, experiment_id, version_number, title, content,
                                             html_content, commit_message, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(version.id)
        .bind(version.experiment_id)
        .bind(version.version_number)
        .bind(&version.title)
        .bind(Json(&version.content))
        .bind(&version.html_content)
        .bind(&version.commit_message)
        .bind(&version.created_by)
        .bind(version.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| insert_version_error(e, version))?;
        Ok(())
    }

    async fn find_version(
        &mut self,
        experiment_id: Uuid,
        version_id: Uuid,
    ) -> StoreResult<Option<Version>> {
        let sql = format!(
            "SELECT {VERSION_COLUMNS} FROM experiment_versions ev WHERE ev.id = $1 AND ev.experiment_id = $2"
        );
        let row = sqlx::query(&sql)
            .bind(version_id)
            .bind(experiment_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.as_ref().map(version_from_row).transpose()?)
    }

    async fn update_experiment(&mut self, experiment: &Experiment) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE experiments
            SET title = $2,
                updated_by = $3,
                current_version_id = $4,
                current_version_number = $5,
                is_deleted = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(experiment.id)
        .bind(&experiment.title)
        .bind(&experiment.updated_by)
        .bind(experiment.current_version_id)
        .bind(experiment.current_version_number)
        .bind(experiment.is_deleted)
        .bind(experiment.updated_at)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::MissingExperiment(experiment.id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
