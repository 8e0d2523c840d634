/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is the central state container. It holds no mutable data of
 * its own; everything a request can change lives behind the experiment
 * store.
 *
 * - `engine` - version control engine over the experiment store
 * - `gate` - bearer token access gate
 * - `llm` - upstream chat completion client
 * - `config` - the configuration the server was started with
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract only the part they
 * need, e.g. `State(engine): State<VersionControl>`.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::AccessGate;
use crate::backend::llm::LlmClient;
use crate::backend::server::config::ServerConfig;
use crate::backend::store::ExperimentStore;
use crate::backend::versioning::VersionControl;

/// Application state shared by all handlers
///
/// Cloning is cheap: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Version control engine
    pub engine: VersionControl,

    /// Access gate resolving bearer tokens into identities
    pub gate: AccessGate,

    /// LLM proxy client
    pub llm: LlmClient,

    /// Configuration the server was started with
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// The store behind the engine
    pub fn store(&self) -> &Arc<dyn ExperimentStore> {
        self.engine.store()
    }
}

impl FromRef<AppState> for VersionControl {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.engine.clone()
    }
}

impl FromRef<AppState> for AccessGate {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.gate.clone()
    }
}

impl FromRef<AppState> for LlmClient {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.llm.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ExperimentStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store().clone()
    }
}
