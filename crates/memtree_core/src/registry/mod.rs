//! In-process registries resolved by string key.

pub mod view_registry;
