// src/config/mod.rs

//! Configuration loading and validation for memodag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like a usable cache directory (`validate.rs`).
//!
//! The resulting [`EngineConfig`] is handed to [`crate::dag::Graph::new`];
//! nothing in the crate reads the cache location from anywhere else.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{CACHE_DIR_ENV, CacheSection, EngineConfig};
pub use validate::validate_config;
