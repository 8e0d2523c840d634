/**
 * Error Conversion
 *
 * All backend errors implement `IntoResponse` from Axum, so handlers return
 * them directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 404
 * }
 * ```
 *
 * A version conflict additionally carries the diagnostic payload:
 *
 * ```json
 * {
 *   "error": "Version conflict",
 *   "status": 409,
 *   "current_version": 2,
 *   "your_version": 1,
 *   "last_updated_by": "user-id",
 *   "last_updated_at": "2025-01-01T00:00:00Z"
 * }
 * ```
 */

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::backend::error::types::BackendError;
use crate::shared::SharedError;

/// Malformed request bodies, including well-formed JSON of the wrong shape
impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        SharedError::validation("body", rejection.body_text()).into()
    }
}

impl From<PathRejection> for BackendError {
    fn from(rejection: PathRejection) -> Self {
        SharedError::validation("path", rejection.body_text()).into()
    }
}

impl From<QueryRejection> for BackendError {
    fn from(rejection: QueryRejection) -> Self {
        SharedError::query("query", rejection.body_text()).into()
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, self);
        }

        let body = match &self {
            BackendError::VersionConflict(conflict) => json!({
                "error": message,
                "status": status.as_u16(),
                "current_version": conflict.current_version,
                "your_version": conflict.your_version,
                "last_updated_by": conflict.last_updated_by,
                "last_updated_at": conflict.last_updated_at,
            }),
            _ => json!({
                "error": message,
                "status": status.as_u16(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
