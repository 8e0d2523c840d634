//! Test servers
//!
//! Each call builds a fresh application over its own in-memory store, so
//! tests never share data.

use std::sync::Arc;

use axum_test::TestServer;
use xpcollab::backend::routes::create_router;
use xpcollab::backend::server::config::{AuthConfig, ServerConfig};
use xpcollab::backend::server::create_state_with_store;
use xpcollab::backend::store::MemoryStore;

/// Server with route protection disabled
pub fn create_test_server() -> TestServer {
    create_test_server_with(false).0
}

/// Server with route protection enabled
pub fn create_protected_test_server() -> TestServer {
    create_test_server_with(true).0
}

/// Server plus a handle on its store, for inspecting raw rows
pub fn create_test_server_with(protection_enabled: bool) -> (TestServer, MemoryStore) {
    let config = ServerConfig {
        auth: AuthConfig {
            protection_enabled,
            ..AuthConfig::default()
        },
        ..ServerConfig::default()
    };
    let store = MemoryStore::new();
    let state = create_state_with_store(config, Arc::new(store.clone()))
        .expect("Failed to create test state");
    let server = TestServer::new(create_router(state)).expect("Failed to create test server");
    (server, store)
}
