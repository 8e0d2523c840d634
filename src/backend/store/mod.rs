//! Experiment Store
//!
//! This module defines the persistence seam of the version control engine.
//! The engine never talks to a database directly; it drives the two traits
//! below, which keeps every versioning rule in one place and lets the same
//! rules run against PostgreSQL in production and an in-memory store in tests.
//!
//! # Architecture
//!
//! - **`ExperimentStore`** - read projections and transaction factory
//! - **`StoreTransaction`** - an open unit of work holding exclusive leases
//! - **`postgres`** - `PgStore`, backed by a bounded `sqlx` pool
//! - **`memory`** - `MemoryStore`, a single-process stand-in
//!
//! # Transactions
//!
//! A `StoreTransaction` is committed explicitly. Dropping it without calling
//! `commit` rolls every staged write back and releases the connection, so an
//! early `?` return in the engine can never leave partial writes behind.
//!
//! # Soft Deletes
//!
//! Read projections never return soft-deleted experiments. Only
//! `StoreTransaction::lock_experiment` returns deleted rows, so the engine can
//! decide how to report them.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::{Experiment, ExperimentSummary, ExperimentView, ListFilter, Version};

/// PostgreSQL store
pub mod postgres;

/// In-memory store
pub mod memory;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Driver or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// `(experiment_id, version_number)` uniqueness was violated
    #[error("Version {version_number} already exists for experiment {experiment_id}")]
    DuplicateVersion {
        experiment_id: Uuid,
        version_number: i32,
    },

    /// A write referenced an experiment row that does not exist
    #[error("Experiment {0} does not exist")]
    MissingExperiment(Uuid),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read access and transaction factory for experiments and their versions
#[async_trait]
pub trait ExperimentStore: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>>;

    /// Experiment merged with its checked-out version
    async fn find_experiment(&self, experiment_id: Uuid) -> StoreResult<Option<ExperimentView>>;

    /// Experiments ordered by `updated_at`, newest first
    async fn list_experiments(&self, filter: &ListFilter) -> StoreResult<Vec<ExperimentSummary>>;

    /// Version of a live experiment
    async fn find_version(
        &self,
        experiment_id: Uuid,
        version_id: Uuid,
    ) -> StoreResult<Option<Version>>;

    /// Versions of an experiment ordered by number, newest first
    async fn list_versions(
        &self,
        experiment_id: Uuid,
        filter: &ListFilter,
    ) -> StoreResult<Vec<Version>>;

    /// Round-trip to the backing storage
    async fn ping(&self) -> StoreResult<()>;

    /// Release pooled resources at shutdown
    async fn close(&self);
}

/// Unit of work with exclusive per-experiment leases
#[async_trait]
pub trait StoreTransaction: Send {
    /// Read an experiment and hold an exclusive lease on it until the
    /// transaction ends. Deleted experiments are returned as well.
    async fn lock_experiment(&mut self, experiment_id: Uuid) -> StoreResult<Option<Experiment>>;

    async fn insert_experiment(&mut self, experiment: &Experiment) -> StoreResult<()>;

    async fn insert_version(&mut self, version: &Version) -> StoreResult<()>;

    /// Version belonging to `experiment_id`
    async fn find_version(
        &mut self,
        experiment_id: Uuid,
        version_id: Uuid,
    ) -> StoreResult<Option<Version>>;

    /// Persist the mutable columns of an experiment: title, `updated_by`,
    /// current version pointer and number, delete flag, `updated_at`
    async fn update_experiment(&mut self, experiment: &Experiment) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
