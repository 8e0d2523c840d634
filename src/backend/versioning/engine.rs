/**
 * Version Control Engine
 *
 * `VersionControl` is a stateless service object. It holds a handle to the
 * experiment store and nothing else, so it is cloned freely into the Axum
 * state and shared by every request.
 *
 * # Optimistic Concurrency
 *
 * Every experiment caches the number of its latest version in
 * `current_version_number`. A client that read version `n` sends `n` back as
 * `base_version_number` when appending. Under the row lock the engine
 * compares it with the cached number; a mismatch means another writer
 * committed in between and the append fails with `VersionConflict`, carrying
 * the server's number and the identity and time of the last write. Callers
 * that omit the base opt out of the check.
 *
 * # Checkout
 *
 * Checkout moves `current_version_id` and `updated_at` only. The cached
 * number keeps tracking the latest version, which keeps the next number
 * `current_version_number + 1` unique.
 */

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::store::ExperimentStore;
use crate::shared::experiment::INITIAL_COMMIT_MESSAGE;
use crate::shared::{
    AppendVersionRequest, CreateExperimentRequest, Experiment, ExperimentSummary, ExperimentView,
    ListFilter, SharedError, UpdateExperimentRequest, Version, VersionConflict,
};

const EXPERIMENT_NOT_FOUND: &str = "Experiment not found";
const VERSION_NOT_FOUND: &str = "Version not found";

/// Version control engine over an experiment store
#[derive(Clone)]
pub struct VersionControl {
    store: Arc<dyn ExperimentStore>,
}

/// Treat empty and whitespace-only strings as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Reject missing and soft-deleted experiments alike
fn live(experiment: Option<Experiment>) -> Result<Experiment, BackendError> {
    experiment
        .filter(|e| !e.is_deleted)
        .ok_or_else(|| BackendError::not_found(EXPERIMENT_NOT_FOUND))
}

impl VersionControl {
    pub fn new(store: Arc<dyn ExperimentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ExperimentStore> {
        &self.store
    }

    /// Create an experiment together with its first version
    ///
    /// Inserts the experiment, inserts version 1 and points the experiment at
    /// it, all in one transaction.
    pub async fn create_experiment(
        &self,
        request: CreateExperimentRequest,
        author: &str,
    ) -> Result<ExperimentView, BackendError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(SharedError::validation("title", "Title is required").into());
        }

        let now = Utc::now();
        let mut experiment = Experiment {
            id: Uuid::new_v4(),
            title: title.to_string(),
            created_by: author.to_string(),
            updated_by: author.to_string(),
            current_version_id: None,
            current_version_number: 1,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        let version = Version {
            id: Uuid::new_v4(),
            experiment_id: experiment.id,
            version_number: 1,
            title: experiment.title.clone(),
            content: request.content.unwrap_or_else(|| json!({})),
            html_content: non_blank(request.html_content),
            commit_message: non_blank(request.commit_message)
                .unwrap_or_else(|| INITIAL_COMMIT_MESSAGE.to_string()),
            created_by: author.to_string(),
            created_at: now,
        };

        let mut tx = self.store.begin().await?;
        tx.insert_experiment(&experiment).await?;
        tx.insert_version(&version).await?;
        experiment.current_version_id = Some(version.id);
        tx.update_experiment(&experiment).await?;
        tx.commit().await?;

        tracing::info!(
            experiment_id = %experiment.id,
            author = %author,
            "Created experiment '{}'",
            experiment.title
        );
        Ok(ExperimentView::merge(experiment, version))
    }

    /// Append a version to the chain under the optimistic concurrency check
    pub async fn append_version(
        &self,
        experiment_id: Uuid,
        request: AppendVersionRequest,
        author: &str,
    ) -> Result<Version, BackendError> {
        let content = request
            .content
            .ok_or_else(|| SharedError::validation("content", "Version content is required"))?;

        let mut tx = self.store.begin().await?;
        let mut experiment = live(tx.lock_experiment(experiment_id).await?)?;

        if let Some(base) = request.base_version_number {
            if base != experiment.current_version_number {
                tracing::warn!(
                    experiment_id = %experiment_id,
                    author = %author,
                    "Rejected append based on version {} (experiment is at {})",
                    base,
                    experiment.current_version_number
                );
                return Err(BackendError::conflict(VersionConflict {
                    current_version: experiment.current_version_number,
                    your_version: base,
                    last_updated_by: experiment.updated_by,
                    last_updated_at: experiment.updated_at,
                }));
            }
        }

        let version_number = experiment.current_version_number + 1;
        let now = Utc::now();
        let version = Version {
            id: Uuid::new_v4(),
            experiment_id,
            version_number,
            title: non_blank(request.title).unwrap_or_else(|| experiment.title.clone()),
            content,
            html_content: non_blank(request.html_content),
            commit_message: non_blank(request.commit_message)
                .unwrap_or_else(|| format!("Version {}", version_number)),
            created_by: author.to_string(),
            created_at: now,
        };
        tx.insert_version(&version).await?;

        experiment.current_version_id = Some(version.id);
        experiment.current_version_number = version_number;
        experiment.updated_by = author.to_string();
        experiment.updated_at = now;
        tx.update_experiment(&experiment).await?;
        tx.commit().await?;

        tracing::info!(
            experiment_id = %experiment_id,
            author = %author,
            "Appended version {}",
            version_number
        );
        Ok(version)
    }

    /// Point the experiment at one of its existing versions
    pub async fn checkout_version(
        &self,
        experiment_id: Uuid,
        version_id: Uuid,
        caller: &str,
    ) -> Result<Version, BackendError> {
        let mut tx = self.store.begin().await?;
        let mut experiment = live(tx.lock_experiment(experiment_id).await?)?;
        let version = tx
            .find_version(experiment_id, version_id)
            .await?
            .ok_or_else(|| BackendError::not_found(VERSION_NOT_FOUND))?;

        experiment.current_version_id = Some(version.id);
        experiment.updated_at = Utc::now();
        tx.update_experiment(&experiment).await?;
        tx.commit().await?;

        tracing::info!(
            experiment_id = %experiment_id,
            caller = %caller,
            "Checked out version {}",
            version.version_number
        );
        Ok(version)
    }

    /// Experiment merged with its checked-out version
    pub async fn get_experiment(&self, experiment_id: Uuid) -> Result<ExperimentView, BackendError> {
        self.store
            .find_experiment(experiment_id)
            .await?
            .ok_or_else(|| BackendError::not_found(EXPERIMENT_NOT_FOUND))
    }

    /// Experiment merged with `version_id`, or with its checked-out version
    pub async fn view_experiment(
        &self,
        experiment_id: Uuid,
        version_id: Option<Uuid>,
    ) -> Result<ExperimentView, BackendError> {
        let current = self.get_experiment(experiment_id).await?;
        let Some(version_id) = version_id else {
            return Ok(current);
        };

        let version = self
            .store
            .find_version(experiment_id, version_id)
            .await?
            .ok_or_else(|| BackendError::not_found(VERSION_NOT_FOUND))?;
        Ok(ExperimentView::merge(current.experiment, version))
    }

    /// Live experiments, most recently updated first
    pub async fn list_experiments(
        &self,
        filter: &ListFilter,
    ) -> Result<Vec<ExperimentSummary>, BackendError> {
        Ok(self.store.list_experiments(filter).await?)
    }

    /// Versions of a live experiment, newest first
    pub async fn version_history(
        &self,
        experiment_id: Uuid,
        filter: &ListFilter,
    ) -> Result<Vec<Version>, BackendError> {
        if self.store.find_experiment(experiment_id).await?.is_none() {
            return Err(BackendError::not_found(EXPERIMENT_NOT_FOUND));
        }
        Ok(self.store.list_versions(experiment_id, filter).await?)
    }

    /// Edit experiment metadata; the version chain is untouched
    pub async fn update_experiment(
        &self,
        experiment_id: Uuid,
        request: UpdateExperimentRequest,
        caller: &str,
    ) -> Result<Experiment, BackendError> {
        let title = match request.title {
            Some(title) if title.trim().is_empty() => {
                return Err(SharedError::validation("title", "Title cannot be empty").into());
            }
            other => other,
        };

        let mut tx = self.store.begin().await?;
        let mut experiment = live(tx.lock_experiment(experiment_id).await?)?;
        if let Some(title) = title {
            experiment.title = title.trim().to_string();
        }
        experiment.updated_at = Utc::now();
        tx.update_experiment(&experiment).await?;
        tx.commit().await?;

        tracing::debug!(experiment_id = %experiment_id, caller = %caller, "Updated experiment metadata");
        Ok(experiment)
    }

    /// Soft-delete an experiment. Deleting twice is `NotFound`.
    pub async fn delete_experiment(
        &self,
        experiment_id: Uuid,
        caller: &str,
    ) -> Result<(), BackendError> {
        let mut tx = self.store.begin().await?;
        let mut experiment = live(tx.lock_experiment(experiment_id).await?)?;
        experiment.is_deleted = true;
        experiment.updated_at = Utc::now();
        tx.update_experiment(&experiment).await?;
        tx.commit().await?;

        tracing::info!(experiment_id = %experiment_id, caller = %caller, "Deleted experiment");
        Ok(())
    }
}
