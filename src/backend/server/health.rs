//! Liveness and database probes

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::backend::store::ExperimentStore;

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "time": Utc::now().to_rfc3339(),
    }))
}

/// `GET /db/ping` reports `{"db": "up"}`, or 500 with the failure
pub async fn db_ping(
    State(store): State<Arc<dyn ExperimentStore>>,
) -> (StatusCode, Json<Value>) {
    match store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "db": "up" }))),
        Err(e) => {
            tracing::error!("Database ping failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "db": "down", "error": e.to_string() })),
            )
        }
    }
}
