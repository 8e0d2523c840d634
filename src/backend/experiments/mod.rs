//! Experiments Module
//!
//! HTTP handlers for experiments and their version chains. Handlers only
//! translate between HTTP and the version control engine; every rule of the
//! version chain is enforced by `VersionControl`.
//!
//! # Handlers
//!
//! - **`create_experiment`** - POST /api/experiments
//! - **`list_experiments`** - GET /api/experiments
//! - **`get_experiment`** - GET /api/experiments/{id}
//! - **`update_experiment`** - PUT /api/experiments/{id}
//! - **`delete_experiment`** - DELETE /api/experiments/{id}
//! - **`append_version`** - POST /api/experiments/{id}/versions
//! - **`version_history`** - GET /api/experiments/{id}/versions
//! - **`checkout_version`** - POST /api/experiments/{id}/versions/{version_id}/checkout
//! - **`view_experiment`** - GET /api/experiments/{id}/view (no authentication)

/// HTTP handlers
pub mod handlers;

pub use handlers::{
    append_version, checkout_version, create_experiment, delete_experiment, get_experiment,
    list_experiments, update_experiment, version_history, view_experiment,
};
