//! Experiment and version records
//!
//! An experiment owns a linear chain of immutable versions numbered `1..=N`.
//! The experiment row points at the version currently checked out and caches
//! the latest version number, which clients echo back as the optimistic
//! concurrency token when appending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Commit message stored with the first version of an experiment
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial version";

/// Experiment registry record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: Uuid,
    pub title: String,
    pub created_by: String,
    /// Identity of the last caller that appended a version
    pub updated_by: String,
    /// Version currently checked out. Only `None` between the two inserts of
    /// the creating transaction.
    pub current_version_id: Option<Uuid>,
    /// Number of the most recently appended version
    pub current_version_number: i32,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable version record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: Uuid,
    pub experiment_id: Uuid,
    pub version_number: i32,
    pub title: String,
    pub content: Value,
    pub html_content: Option<String>,
    pub commit_message: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Experiment merged with the content of one of its versions
///
/// Returned by `get_experiment` (checked-out version), by the public view
/// endpoint and by `create_experiment` (version 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentView {
    #[serde(flatten)]
    pub experiment: Experiment,
    pub version_number: i32,
    pub version_title: String,
    pub content: Value,
    pub html_content: Option<String>,
    pub commit_message: String,
    pub version_created_at: DateTime<Utc>,
}

impl ExperimentView {
    /// Merge an experiment with one of its versions
    pub fn merge(experiment: Experiment, version: Version) -> Self {
        Self {
            experiment,
            version_number: version.version_number,
            version_title: version.title,
            content: version.content,
            html_content: version.html_content,
            commit_message: version.commit_message,
            version_created_at: version.created_at,
        }
    }
}

/// List entry for the experiment overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub id: Uuid,
    pub title: String,
    pub created_by: String,
    pub current_version_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version_number: Option<i32>,
    pub version_title: Option<String>,
    pub content: Option<Value>,
    pub version_created_at: Option<DateTime<Utc>>,
}

/// Diagnostic payload of a rejected append
///
/// `current_version` is the server's latest version number and
/// `your_version` the stale base the caller submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionConflict {
    pub current_version: i32,
    pub your_version: i32,
    pub last_updated_by: String,
    pub last_updated_at: DateTime<Utc>,
}

/// Body of `POST /api/experiments`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateExperimentRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub commit_message: Option<String>,
}

/// Body of `POST /api/experiments/{id}/versions`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppendVersionRequest {
    /// Version number the edit was based on. `None` skips the conflict check.
    #[serde(default)]
    pub base_version_number: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub commit_message: Option<String>,
}

/// Body of `PUT /api/experiments/{id}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateExperimentRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Query string of the list endpoints
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Translate page based paging into an offset/limit filter
    pub fn to_filter(&self) -> Result<ListFilter, SharedError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(SharedError::query("page", "must be at least 1"));
        }
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(SharedError::query(
                "limit",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }

        Ok(ListFilter {
            search: self.search.clone(),
            offset: i64::from(page - 1) * i64::from(limit),
            limit: i64::from(limit),
        })
    }
}

/// Search and pagination applied by the stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    /// Case-insensitive substring matched against titles
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            search: None,
            offset: 0,
            limit: i64::from(DEFAULT_PAGE_SIZE),
        }
    }
}

impl ListFilter {
    /// Non-empty search term, if any
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether a title passes the search term
    pub fn matches(&self, title: &str) -> bool {
        match self.search_term() {
            Some(term) => title.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        }
    }

    /// `ILIKE` pattern for the search term, with `\` as escape character
    pub fn like_pattern(&self) -> Option<String> {
        self.search_term().map(|term| {
            let mut escaped = String::with_capacity(term.len() + 2);
            escaped.push('%');
            for c in term.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(c);
            }
            escaped.push('%');
            escaped
        })
    }
}
