//! Version Control Module
//!
//! This module holds the version control engine: the only place where the
//! rules of the version chain live.
//!
//! # Version Chain Rules
//!
//! - Version numbers of one experiment are `1..=N` without gaps. They are
//!   never reused and never decremented, checkouts included.
//! - An append is atomic with the move of the experiment's current-version
//!   pointer.
//! - Appends that name a stale base version number are rejected with a
//!   `VersionConflict`; nothing is merged or overwritten.
//! - Checkout moves the pointer only. It never creates or removes versions.
//! - Deletion is a soft delete and is terminal.
//!
//! # Concurrency
//!
//! Every mutation runs inside one store transaction and takes an exclusive
//! lease on the experiment row first. Concurrent mutations of one experiment
//! are therefore serialized, while different experiments proceed in parallel.

/// Version control engine
pub mod engine;

pub use engine::VersionControl;
