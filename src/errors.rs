// src/errors.rs

//! Crate-wide error type.
//!
//! Every failure in the core is fatal to the current `resolve` / `invalidate`
//! / `run` call chain and is surfaced unchanged to the top-level caller.
//! There is no retry policy anywhere; the caller decides what to do.

use std::path::PathBuf;

use thiserror::Error;

use crate::dag::NodeId;

#[derive(Error, Debug)]
pub enum MemodagError {
    /// A leaf node was resolved while its external resource is absent.
    #[error("Resource not found: {address}")]
    ResourceMissing { address: String },

    /// A cache slot exists but its contents cannot be decoded.
    #[error("Cache slot '{identifier}' could not be decoded: {source}")]
    Deserialization {
        identifier: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Value for cache slot '{identifier}' could not be encoded: {source}")]
    Serialization {
        identifier: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cache IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The task function itself returned an error.
    #[error("Task '{identifier}' failed: {source}")]
    Task {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Node '{identifier}' is a leaf and has no function to run")]
    NotComputed { identifier: String },

    #[error("Node {0:?} does not belong to this graph")]
    UnknownNode(NodeId),

    /// The same key was given twice among a node's named dependencies.
    #[error("Node '{identifier}' names dependency '{name}' more than once")]
    DuplicateName { identifier: String, name: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MemodagError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MemodagError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MemodagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_missing_names_the_address() {
        let err = MemodagError::ResourceMissing {
            address: "data/raw.csv".to_string(),
        };
        assert_eq!(err.to_string(), "Resource not found: data/raw.csv");
    }

    #[test]
    fn task_error_keeps_its_source() {
        let err = MemodagError::Task {
            identifier: "train.json".to_string(),
            source: anyhow::anyhow!("division by zero"),
        };
        let msg = err.to_string();
        assert!(msg.contains("train.json"));
        assert!(msg.contains("division by zero"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
