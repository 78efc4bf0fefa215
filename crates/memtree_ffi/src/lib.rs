//! Flutter bridge surface for memtree core.

pub mod api;
