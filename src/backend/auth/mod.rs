//! Authentication Module
//!
//! This module resolves caller identities from bearer tokens issued by an
//! external identity provider. The server never issues tokens itself.
//!
//! # Architecture
//!
//! - **`sessions`** - Token decoding and claim validation
//! - **`gate`** - Header parsing, protection mode and role helpers
//! - **`handlers`** - HTTP handlers for the identity endpoints
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── sessions.rs     - Token verification
//! ├── gate.rs         - Access gate
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Protection Modes
//!
//! With protection enabled, requests to protected routes need a valid bearer
//! token and are rejected with 401 otherwise. With protection disabled, a
//! missing or invalid token makes the caller `anonymous`.

/// Token verification
pub mod sessions;

/// Access gate
pub mod gate;

/// HTTP handlers for identity endpoints
pub mod handlers;

pub use gate::{AccessGate, RoleRequirement};
pub use handlers::{auth_check, current_user};
pub use sessions::{AuthError, Claims, TokenVerifier};
