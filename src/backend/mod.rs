//! Backend Module
//!
//! This module contains all server-side code: an Axum HTTP server exposing
//! experiments and their version histories, an access gate for bearer
//! tokens, and an LLM proxy.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state and initialization
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`versioning`** - Version control engine (the rules of the version chain)
//! - **`store`** - Experiment persistence: PostgreSQL and in-memory
//! - **`experiments`** - HTTP handlers for experiments and versions
//! - **`auth`** - Token verification, access gate, identity endpoints
//! - **`middleware`** - Identity resolution for requests
//! - **`llm`** - Chat completion passthrough
//! - **`error`** - Backend error types and their HTTP rendering
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── versioning/     - Version control engine
//! ├── store/          - Experiment stores
//! ├── experiments/    - Experiment handlers
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! ├── llm/            - LLM proxy
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! Handlers share an `AppState` holding the engine, the access gate and the
//! LLM client. None of them keeps mutable state in process; all mutable data
//! lives in the store, behind transactions.
//!
//! # Error Handling
//!
//! Handlers return `BackendError`, which renders as a JSON body
//! `{"error": ..., "status": ...}` with the matching status code. Version
//! conflicts add the fields of `VersionConflict`.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Version control engine
pub mod versioning;

/// Experiment persistence
pub mod store;

/// Experiment and version handlers
pub mod experiments;

/// Backend error types
pub mod error;

/// Authentication
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// LLM proxy
pub mod llm;

pub use error::BackendError;
pub use server::{create_state, AppState, ServerConfig};
pub use versioning::VersionControl;
