//! Shared Error Types
//!
//! This module defines error types for malformed input. They are raised while
//! validating requests, before any storage is touched.
//!
//! # Usage
//!
//! ```rust
//! use xpcollab::shared::error::SharedError;
//!
//! let error = SharedError::validation("content", "Version content is required");
//! ```
use thiserror::Error;

/// Input errors shared by the engine and the HTTP layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Query parameter error (pagination, search)
    #[error("Invalid query parameter '{name}': {message}")]
    QueryError {
        /// Parameter name
        name: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new query parameter error
    pub fn query(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryError {
            name: name.into(),
            message: message.into(),
        }
    }
}
