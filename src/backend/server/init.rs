/**
 * Server Initialization
 *
 * This module builds the application state from a `ServerConfig`.
 *
 * # Initialization Process
 *
 * 1. Open the experiment store: PostgreSQL when a database is configured,
 *    the in-memory store otherwise
 * 2. Apply schema migrations
 * 3. Build the access gate from the realm settings
 * 4. Build the LLM client
 *
 * # Error Handling
 *
 * - Missing database: the server runs on the in-memory store
 * - Unreachable database or unusable realm key: startup fails
 * - Migration failures: logged but don't prevent startup
 */

use std::sync::Arc;

use thiserror::Error;

use crate::backend::auth::{AccessGate, AuthError};
use crate::backend::llm::LlmClient;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;
use crate::backend::store::{ExperimentStore, MemoryStore, PgStore, StoreError};
use crate::backend::versioning::VersionControl;

/// Startup failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Failed to connect to database: {0}")]
    Database(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Open the configured store and build the application state
pub async fn create_state(config: ServerConfig) -> Result<AppState, InitError> {
    let store: Arc<dyn ExperimentStore> = match &config.database {
        Some(database) => {
            let store = PgStore::connect(
                database.connect_options.clone(),
                database.max_connections,
                database.idle_timeout,
            )
            .await?;
            tracing::info!(
                max_connections = database.max_connections,
                "Database connection pool created"
            );

            match store.migrate().await {
                Ok(()) => tracing::info!("Database migrations applied"),
                Err(e) => tracing::error!("Failed to run migrations: {}", e),
            }
            Arc::new(store)
        }
        None => {
            tracing::warn!("No database configured; experiments are kept in memory and lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    create_state_with_store(config, store)
}

/// Build the application state over an already opened store
pub fn create_state_with_store(
    config: ServerConfig,
    store: Arc<dyn ExperimentStore>,
) -> Result<AppState, InitError> {
    let gate = AccessGate::from_config(&config.auth)?;
    tracing::info!(
        protection_enabled = gate.protection_enabled(),
        "Access gate configured"
    );

    Ok(AppState {
        engine: VersionControl::new(store),
        gate,
        llm: LlmClient::new(config.llm.clone()),
        config: Arc::new(config),
    })
}
