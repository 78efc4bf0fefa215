//! Rendering-facing projections of the memory tree.
//!
//! # Responsibility
//! - Flatten a tree plus expansion state into ordered rows.
//! - Interpret directional key input against those rows.
//! - Derive short previews of document content.

pub mod navigation;
pub mod preview;
pub mod rows;
