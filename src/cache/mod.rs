// src/cache/mod.rs

//! Durable cache store.
//!
//! A cache store is a directory of keyed slots. Each computed node owns one
//! slot, a single file named by the node's identifier, holding exactly one
//! JSON-encoded value. The store knows nothing about the graph.

pub mod store;

pub use store::{CacheStore, STAGING_DIR};
