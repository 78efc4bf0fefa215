//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define persistence contracts for memory tree snapshots.
//! - Isolate SQLite query details from session orchestration.
//!
//! # Invariants
//! - Repositories never hand out a tree that fails validation.

pub mod snapshot_repo;
