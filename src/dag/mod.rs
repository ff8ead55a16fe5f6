// src/dag/mod.rs

//! Dependency graph and lazy evaluation.
//!
//! - [`node`] holds the node kinds (leaf vs. computed) and task arguments.
//! - [`graph`] is the arena that owns every node and wires the mirrored
//!   upstream / downstream edges at construction time.
//! - [`eval`] implements pull-based resolution through the cache store.
//! - [`invalidate`] deletes cache slots and cascades to dependents.

pub mod eval;
pub mod graph;
pub mod invalidate;
pub mod node;

pub use graph::{Graph, SLOT_EXTENSION};
pub use node::{Computed, NO_NAMED, Node, NodeId, NodeKind, TaskArgs, TaskFn};
