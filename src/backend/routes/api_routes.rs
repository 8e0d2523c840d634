/**
 * API Route Configuration
 *
 * This module groups the API endpoints by the identity they need:
 *
 * ## Public
 * - `GET /health` - Liveness probe
 * - `GET /db/ping` - Database round trip
 * - `GET /api/experiments/{id}/view` - Read-only experiment view
 *
 * ## Optional identity
 * - `GET /auth/check` - Identity if present, never 401
 *
 * ## Required identity
 * - `GET /auth/user` - Current user with role flags
 * - `POST /api/llm/chat` - LLM proxy
 * - `/api/experiments` - Experiment and version endpoints
 */

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::backend::auth::{auth_check, current_user};
use crate::backend::experiments::{
    append_version, checkout_version, create_experiment, delete_experiment, get_experiment,
    list_experiments, update_experiment, version_history, view_experiment,
};
use crate::backend::llm::chat;
use crate::backend::middleware::{optional_identity, require_identity};
use crate::backend::server::health::{db_ping, health};
use crate::backend::server::state::AppState;

/// Routes that need no identity
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/db/ping", get(db_ping))
        .route("/api/experiments/{id}/view", get(view_experiment))
}

/// Routes that report on the caller if one is present
pub fn optional_auth_routes(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/check", get(auth_check))
        .route_layer(from_fn_with_state(app_state.clone(), optional_identity))
}

/// Routes that act on behalf of a caller
///
/// With route protection enabled, requests without a valid bearer token are
/// rejected with 401 before reaching a handler.
pub fn protected_routes(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/user", get(current_user))
        .route("/api/llm/chat", post(chat))
        .route(
            "/api/experiments",
            post(create_experiment).get(list_experiments),
        )
        .route(
            "/api/experiments/{id}",
            get(get_experiment)
                .put(update_experiment)
                .delete(delete_experiment),
        )
        .route(
            "/api/experiments/{id}/versions",
            post(append_version).get(version_history),
        )
        .route(
            "/api/experiments/{id}/versions/{version_id}/checkout",
            post(checkout_version),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_identity))
}
