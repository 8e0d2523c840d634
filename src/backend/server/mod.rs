//! Server Module
//!
//! This module contains the server-side setup: configuration, application
//! state and initialization.
//!
//! # Architecture
//!
//! - **`config`** - Configuration loading and validation
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`init`** - Store selection and state creation
//! - **`health`** - Liveness and database probes
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── config.rs       - Configuration loading (port, database, realm, LLM)
//! ├── state.rs        - AppState and FromRef implementations
//! ├── init.rs         - Server initialization
//! └── health.rs       - /health and /db/ping
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::from_env`
//! 2. **State Creation**: `create_state` opens the store and builds the gate
//! 3. **Router Creation**: `routes::create_router` wires handlers and middleware

/// Server configuration loading
pub mod config;

/// Application state management
pub mod state;

/// Server initialization
pub mod init;

/// Health probes
pub mod health;

pub use config::{ConfigError, ServerConfig};
pub use init::{create_state, create_state_with_store, InitError};
pub use state::AppState;
