/**
 * Backend Error Types
 *
 * This module defines the error taxonomy of the backend. Every failure a
 * handler can return maps onto exactly one HTTP status.
 *
 * # Error Categories
 *
 * - `NotFound` - experiment or version absent or soft-deleted (404)
 * - `VersionConflict` - optimistic concurrency check failed (409)
 * - `ValidationFailure` - malformed input (400)
 * - `Unauthenticated` / `Forbidden` - raised by the access gate (401 / 403)
 * - `UpstreamFailure` - the LLM provider failed or is unreachable (500)
 * - `Store` - database or connection failure (500)
 *
 * The engine never distinguishes "absent" from "deleted" when reporting
 * `NotFound`.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::{SharedError, VersionConflict};

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Experiment or version does not exist or was soft-deleted
    #[error("{message}")]
    NotFound {
        /// Human-readable error message
        message: String,
    },

    /// Caller's base version number is stale
    #[error(
        "Version conflict: experiment is at version {}, request was based on version {}",
        .0.current_version,
        .0.your_version
    )]
    VersionConflict(Box<VersionConflict>),

    /// Malformed input
    #[error(transparent)]
    ValidationFailure(#[from] SharedError),

    /// LLM provider returned non-success or could not be reached
    #[error("{message}")]
    UpstreamFailure {
        /// Human-readable error message
        message: String,
    },

    /// No usable identity on the request
    #[error("{message}")]
    Unauthenticated {
        /// Human-readable error message
        message: String,
    },

    /// Identity lacks a required role
    #[error("{message}")]
    Forbidden {
        /// Human-readable error message
        message: String,
    },

    /// Storage failure; the enclosing transaction has been rolled back
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BackendError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(conflict: VersionConflict) -> Self {
        Self::VersionConflict(Box::new(conflict))
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::VersionConflict(_) => StatusCode::CONFLICT,
            Self::ValidationFailure(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::VersionConflict(_) => "Version conflict".to_string(),
            other => other.to_string(),
        }
    }
}
