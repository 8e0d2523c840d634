//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation and layers
//! └── api_routes.rs   - Route groups by required identity
//! ```
//!
//! # Route Organization
//!
//! 1. **Public Routes** - Health probes and the read-only experiment view
//! 2. **Optional Auth Routes** - `/auth/check`
//! 3. **Protected Routes** - Identity, experiments, versions and LLM proxy
//! 4. **Fallback Handler** - JSON 404 for unknown routes
//!
//! # Example
//!
//! ```rust,no_run
//! use xpcollab::backend::routes::create_router;
//! use xpcollab::backend::server::{create_state, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = create_state(ServerConfig::from_env()?).await?;
//! let router = create_router(state);
//! # Ok(())
//! # }
//! ```

/// Main router creation
pub mod router;

/// Route groups
pub mod api_routes;

pub use router::create_router;
