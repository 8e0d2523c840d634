//! XPCollab - Main Library
//!
//! XPCollab is the backend of a collaborative experiment editor. It stores
//! experiments together with an append-only history of versions, lets editors
//! check out earlier versions, and proxies chat requests to an LLM provider.
//!
//! # Module Structure
//!
//! The library is organized into two main modules:
//!
//! - **`shared`** - Types shared between the backend and its clients
//!   - Experiment and version records, request/response payloads
//!   - Resolved caller identity
//!   - Validation error types
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server, routes and middleware
//!   - Version control engine with optimistic concurrency
//!   - PostgreSQL and in-memory experiment stores
//!   - Access gate (bearer token verification) and LLM proxy
//!
//! # Usage
//!
//! ```rust,no_run
//! use xpcollab::backend::server::{config::ServerConfig, init::create_state};
//! use xpcollab::backend::routes::create_router;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let state = create_state(config).await?;
//! let app = create_router(state);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Mutations of one experiment are serialized by an exclusive row lock held for
//! the duration of the transaction. Writers that based their edit on a stale
//! version number receive a `VersionConflict` instead of overwriting history.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
