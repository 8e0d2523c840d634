//! LLM Proxy Module
//!
//! Stateless passthrough to a third-party chat completion API. The server
//! holds the upstream key so browsers never see it. Requests are forwarded
//! with defaults filled in, and the upstream JSON is returned unchanged.
//!
//! # Module Structure
//!
//! ```text
//! llm/
//! ├── mod.rs      - Module exports and documentation
//! ├── client.rs   - Upstream HTTP client
//! └── handlers.rs - POST /api/llm/chat
//! ```

/// Upstream HTTP client
pub mod client;

/// HTTP handler
pub mod handlers;

pub use client::{ChatRequest, LlmClient};
pub use handlers::chat;
