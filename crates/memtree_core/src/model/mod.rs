//! Domain model for the memory document tree.
//!
//! # Responsibility
//! - Define the node and tree shapes shared by every core operation.
//!
//! # Invariants
//! - Every node is identified by a stable `NodeId` and a unique canonical path.
//! - Trees are persistent: nodes behind `Arc` are never mutated in place.

pub mod memory_node;
