//! In-memory experiment store
//!
//! Used when no database is configured and throughout the test suite. A
//! transaction holds one store-wide lock for its whole lifetime. Its writes
//! are staged per row and read back ahead of the committed tables; `commit`
//! publishes only those rows and dropping the transaction discards them. The
//! store-wide lock is coarser than the per-row lease PostgreSQL provides:
//! writers of different experiments are serialized too.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{ExperimentStore, StoreError, StoreResult, StoreTransaction};
use crate::shared::{Experiment, ExperimentSummary, ExperimentView, ListFilter, Version};

#[derive(Debug, Default)]
struct Tables {
    experiments: HashMap<Uuid, Experiment>,
    versions: HashMap<Uuid, Version>,
    /// `(experiment_id, version_number)` of every stored version
    version_numbers: HashSet<(Uuid, i32)>,
}

impl Tables {
    fn live_experiment(&self, experiment_id: Uuid) -> Option<&Experiment> {
        self.experiments
            .get(&experiment_id)
            .filter(|experiment| !experiment.is_deleted)
    }

    fn version_of(&self, experiment_id: Uuid, version_id: Uuid) -> Option<&Version> {
        self.versions
            .get(&version_id)
            .filter(|version| version.experiment_id == experiment_id)
    }
}

/// Process-local experiment store
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored versions, deleted experiments included
    pub async fn version_count(&self) -> usize {
        self.tables.lock().await.versions.len()
    }

    /// Raw experiment row, deleted or not
    pub async fn raw_experiment(&self, experiment_id: Uuid) -> Option<Experiment> {
        self.tables.lock().await.experiments.get(&experiment_id).cloned()
    }

    /// Every stored version of an experiment ordered by number, deleted
    /// experiments included
    pub async fn raw_versions(&self, experiment_id: Uuid) -> Vec<Version> {
        let tables = self.tables.lock().await;
        let mut versions: Vec<Version> = tables
            .versions
            .values()
            .filter(|version| version.experiment_id == experiment_id)
            .cloned()
            .collect();
        versions.sort_by_key(|version| version.version_number);
        versions
    }
}

fn page<T>(items: Vec<T>, filter: &ListFilter) -> Vec<T> {
    let offset = usize::try_from(filter.offset).unwrap_or(0);
    let limit = usize::try_from(filter.limit).unwrap_or(0);
    items.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl ExperimentStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTransaction>> {
        let guard = self.tables.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            guard,
            experiments: HashMap::new(),
            versions: HashMap::new(),
        }))
    }

    async fn find_experiment(&self, experiment_id: Uuid) -> StoreResult<Option<ExperimentView>> {
        let tables = self.tables.lock().await;
        let view = tables.live_experiment(experiment_id).and_then(|experiment| {
            let version = tables.version_of(experiment_id, experiment.current_version_id?)?;
            Some(ExperimentView::merge(experiment.clone(), version.clone()))
        });
        Ok(view)
    }

    async fn list_experiments(&self, filter: &ListFilter) -> StoreResult<Vec<ExperimentSummary>> {
        let tables = self.tables.lock().await;
        let mut experiments: Vec<&Experiment> = tables
            .experiments
            .values()
            .filter(|experiment| !experiment.is_deleted && filter.matches(&experiment.title))
            .collect();
        experiments.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));

        let summaries = experiments
            .into_iter()
            .map(|experiment| {
                let version = experiment
                    .current_version_id
                    .and_then(|version_id| tables.version_of(experiment.id, version_id));
                ExperimentSummary {
                    id: experiment.id,
                    title: experiment.title.clone(),
                    created_by: experiment.created_by.clone(),
                    current_version_id: experiment.current_version_id,
                    created_at: experiment.created_at,
                    updated_at: experiment.updated_at,
                    version_number: version.map(|v| v.version_number),
                    version_title: version.map(|v| v.title.clone()),
                    content: version.map(|v| v.content.clone()),
                    version_created_at: version.map(|v| v.created_at),
                }
            })
            .collect();
        Ok(page(summaries, filter))
    }

    async fn find_version(
        &self,
        experiment_id: Uuid,
        version_id: Uuid,
    ) -> StoreResult<Option<Version>> {
        let tables = self.tables.lock().await;
        if tables.live_experiment(experiment_id).is_none() {
            return Ok(None);
        }
        Ok(tables.version_of(experiment_id, version_id).cloned())
    }

    async fn list_versions(
        &self,
        experiment_id: Uuid,
        filter: &ListFilter,
    ) -> StoreResult<Vec<Version>> {
        let tables = self.tables.lock().await;
        let mut versions: Vec<Version> = tables
            .versions
            .values()
            .filter(|version| version.experiment_id == experiment_id && filter.matches(&version.title))
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(page(versions, filter))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}

/// Rows written under the store-wide lock, not yet published
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    experiments: HashMap<Uuid, Experiment>,
    versions: HashMap<Uuid, Version>,
}

impl MemoryTransaction {
    fn experiment(&self, experiment_id: Uuid) -> Option<&Experiment> {
        self.experiments
            .get(&experiment_id)
            .or_else(|| self.guard.experiments.get(&experiment_id))
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_experiment(&mut self, experiment_id: Uuid) -> StoreResult<Option<Experiment>> {
        Ok(self.experiment(experiment_id).cloned())
    }

    async fn insert_experiment(&mut self, experiment: &Experiment) -> StoreResult<()> {
        self.experiments.insert(experiment.id, experiment.clone());
        Ok(())
    }

    async fn insert_version(&mut self, version: &Version) -> StoreResult<()> {
        if self.experiment(version.experiment_id).is_none() {
            return Err(StoreError::MissingExperiment(version.experiment_id));
        }
        let key = (version.experiment_id, version.version_number);
        let duplicate = self.guard.version_numbers.contains(&key)
            || self
                .versions
                .values()
                .any(|staged| (staged.experiment_id, staged.version_number) == key);
        if duplicate {
            return Err(StoreError::DuplicateVersion {
                experiment_id: version.experiment_id,
                version_number: version.version_number,
            });
        }
        self.versions.insert(version.id, version.clone());
        Ok(())
    }

    async fn find_version(
        &mut self,
        experiment_id: Uuid,
        version_id: Uuid,
    ) -> StoreResult<Option<Version>> {
        let staged = self
            .versions
            .get(&version_id)
            .filter(|version| version.experiment_id == experiment_id);
        Ok(staged
            .or_else(|| self.guard.version_of(experiment_id, version_id))
            .cloned())
    }

    async fn update_experiment(&mut self, experiment: &Experiment) -> StoreResult<()> {
        if self.experiment(experiment.id).is_none() {
            return Err(StoreError::MissingExperiment(experiment.id));
        }
        self.experiments.insert(experiment.id, experiment.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction {
            mut guard,
            experiments,
            versions,
        } = *self;
        guard.experiments.extend(experiments);
        for (id, version) in versions {
            guard
                .version_numbers
                .insert((version.experiment_id, version.version_number));
            guard.versions.insert(id, version);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn experiment(title: &str) -> Experiment {
        let now = Utc::now();
        Experiment {
            id: Uuid::new_v4(),
            title: title.to_string(),
            created_by: "alice".to_string(),
            updated_by: "alice".to_string(),
            current_version_id: None,
            current_version_number: 1,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn version(experiment_id: Uuid, number: i32) -> Version {
        Version {
            id: Uuid::new_v4(),
            experiment_id,
            version_number: number,
            title: format!("v{}", number),
            content: json!({ "n": number }),
            html_content: None,
            commit_message: format!("Version {}", number),
            created_by: "alice".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_uncommitted_transaction_rolls_back() {
        let store = MemoryStore::new();
        let exp = experiment("Draft");

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_experiment(&exp).await.unwrap();
            tx.insert_version(&version(exp.id, 1)).await.unwrap();
        }

        assert!(store.raw_experiment(exp.id).await.is_none());
        assert_eq!(store.version_count().await, 0);
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryStore::new();
        let mut exp = experiment("Draft");
        let v1 = version(exp.id, 1);

        let mut tx = store.begin().await.unwrap();
        tx.insert_experiment(&exp).await.unwrap();
        tx.insert_version(&v1).await.unwrap();
        exp.current_version_id = Some(v1.id);
        tx.update_experiment(&exp).await.unwrap();
        tx.commit().await.unwrap();

        let view = store.find_experiment(exp.id).await.unwrap().unwrap();
        assert_eq!(view.version_number, 1);
        assert_eq!(view.content, json!({ "n": 1 }));
    }

    #[tokio::test]
    async fn test_duplicate_version_number_rejected() {
        let store = MemoryStore::new();
        let exp = experiment("Draft");

        let mut tx = store.begin().await.unwrap();
        tx.insert_experiment(&exp).await.unwrap();
        tx.insert_version(&version(exp.id, 1)).await.unwrap();
        let err = tx.insert_version(&version(exp.id, 1)).await.unwrap_err();

        assert!(matches!(
            err,
            StoreError::DuplicateVersion { version_number: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_committed_number_blocks_later_duplicate() {
        let store = MemoryStore::new();
        let exp = experiment("Draft");
        let other = experiment("Other");

        let mut tx = store.begin().await.unwrap();
        tx.insert_experiment(&exp).await.unwrap();
        tx.insert_experiment(&other).await.unwrap();
        tx.insert_version(&version(exp.id, 1)).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let err = tx.insert_version(&version(exp.id, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateVersion { .. }));
        tx.insert_version(&version(other.id, 1)).await.unwrap();
        tx.insert_version(&version(exp.id, 2)).await.unwrap();

        let mut renamed = exp.clone();
        renamed.title = "Renamed".to_string();
        tx.update_experiment(&renamed).await.unwrap();
        assert_eq!(
            tx.lock_experiment(exp.id).await.unwrap().unwrap().title,
            "Renamed"
        );
        drop(tx);

        assert_eq!(store.raw_experiment(exp.id).await.unwrap().title, "Draft");
        assert_eq!(store.raw_experiment(other.id).await.unwrap().title, "Other");
        assert_eq!(store.version_count().await, 1);
    }

    #[tokio::test]
    async fn test_version_requires_existing_experiment() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let err = tx.insert_version(&version(Uuid::new_v4(), 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingExperiment(_)));
    }

    #[tokio::test]
    async fn test_list_versions_paginates_newest_first() {
        let store = MemoryStore::new();
        let exp = experiment("Draft");

        let mut tx = store.begin().await.unwrap();
        tx.insert_experiment(&exp).await.unwrap();
        for n in 1..=5 {
            tx.insert_version(&version(exp.id, n)).await.unwrap();
        }
        tx.commit().await.unwrap();

        let filter = ListFilter {
            search: None,
            offset: 1,
            limit: 2,
        };
        let numbers: Vec<i32> = store
            .list_versions(exp.id, &filter)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        assert_eq!(numbers, vec![4, 3]);
    }
}
