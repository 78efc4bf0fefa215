//! Path-addressed memory tree operations.
//!
//! # Responsibility
//! - Canonicalize and decompose node paths.
//! - Look up nodes and apply copy-on-write edits.
//!
//! # Invariants
//! - Operations are synchronous, pure and never perform I/O.

pub mod error;
pub mod mutation;
pub mod path;
pub mod query;
