//! Common test utilities and helpers
//!
//! - Test servers over the in-memory store
//! - Bearer token minting
//! - PostgreSQL fixtures, used when `DATABASE_URL` is set
//! - Custom assertion macros

#![allow(dead_code)]

pub mod assertions;
pub mod auth_helpers;
pub mod database;
pub mod server;

pub use assertions::*;
pub use auth_helpers::*;
pub use database::*;
pub use server::*;
