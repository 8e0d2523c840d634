//! Middleware Module
//!
//! This module contains all HTTP middleware for the backend server.
//! Middleware functions process requests before they reach handlers.
//!
//! # Architecture
//!
//! - **`auth`** - Identity resolution for protected and optional-auth routes,
//!   plus role guards
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//! use xpcollab::backend::middleware::require_identity;
//!
//! let protected = api_routes.route_layer(from_fn_with_state(state.clone(), require_identity));
//! ```

pub mod auth;

pub use auth::{optional_identity, require_identity, require_role, AuthUser, MaybeUser};
