//! Authentication Handlers Module
//!
//! HTTP handlers for the identity endpoints. Token handling itself lives in
//! the access gate; these handlers only report what it resolved.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Response types
//! ├── check.rs    - Optional identity probe
//! └── me.rs       - Get current user handler
//! ```
//!
//! # Handlers
//!
//! - **`auth_check`** - GET /auth/check - Identity if present, never 401
//! - **`current_user`** - GET /auth/user - Identity with role flags, 401 if anonymous

/// Response types
pub mod types;

/// Identity probe handler
pub mod check;

/// Get current user handler
pub mod me;

pub use check::auth_check;
pub use me::current_user;
