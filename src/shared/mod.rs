//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the backend and its HTTP clients. All types are designed for JSON
//! serialization.

/// Experiment and version records
pub mod experiment;

/// Resolved caller identity
pub mod identity;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use experiment::{
    AppendVersionRequest, CreateExperimentRequest, Experiment, ExperimentSummary,
    ExperimentView, ListFilter, ListQuery, UpdateExperimentRequest, Version, VersionConflict,
};
pub use identity::UserInfo;
