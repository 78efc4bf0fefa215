//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate tree edits, view state and editor state for one UI owner.
//! - Keep rendering and persistence layers decoupled from tree internals.

pub mod editor_session;
pub mod memory_manager;
