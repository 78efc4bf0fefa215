//! Process-local caches with explicit lifetime and invalidation.

pub mod suggestion_cache;
