// src/dag/node.rs

//! Node data model: the closed set of node kinds and the arguments a task
//! function receives.

use std::fmt;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Handle to a node inside a [`crate::dag::Graph`] arena.
///
/// Handles are plain indices; they are only meaningful for the graph that
/// issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Empty named-dependency list, for tasks with positional dependencies only.
pub const NO_NAMED: [(&str, NodeId); 0] = [];

/// Signature of every task body.
pub type TaskFn = Box<dyn Fn(&TaskArgs) -> anyhow::Result<Value>>;

/// Resolved dependency values handed to a task function.
///
/// Both groups follow the order the dependencies were declared in. Named
/// keys are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskArgs {
    pub positional: Vec<Value>,
    pub named: Vec<(String, Value)>,
}

impl TaskArgs {
    pub fn new(positional: Vec<Value>, named: Vec<(String, Value)>) -> Self {
        Self { positional, named }
    }

    /// Raw value of the named argument `key`.
    pub fn named_value(&self, key: &str) -> Option<&Value> {
        self.named.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Decode the positional argument at `index`.
    pub fn arg<T: DeserializeOwned>(&self, index: usize) -> anyhow::Result<T> {
        let value = self
            .positional
            .get(index)
            .with_context(|| format!("missing positional argument {index}"))?;
        serde_json::from_value(value.clone())
            .with_context(|| format!("decoding positional argument {index}"))
    }

    /// Decode the named argument `key`.
    pub fn named_arg<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<T> {
        let value = self
            .named_value(key)
            .with_context(|| format!("missing named argument '{key}'"))?;
        serde_json::from_value(value.clone())
            .with_context(|| format!("decoding named argument '{key}'"))
    }
}

/// A node backed by a function whose result lives in a cache slot.
pub struct Computed {
    pub(crate) function: TaskFn,
    pub(crate) upstream_positional: Vec<NodeId>,
    pub(crate) upstream_named: Vec<(String, NodeId)>,
}

impl Computed {
    pub fn upstream_positional(&self) -> &[NodeId] {
        &self.upstream_positional
    }

    pub fn upstream_named(&self) -> &[(String, NodeId)] {
        &self.upstream_named
    }

    /// All upstream nodes: positional ones first, then named ones, each group
    /// in declaration order.
    pub fn upstream(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.upstream_positional
            .iter()
            .copied()
            .chain(self.upstream_named.iter().map(|(_, id)| *id))
    }
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("upstream_positional", &self.upstream_positional)
            .field("upstream_named", &self.upstream_named)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum NodeKind {
    /// Externally produced resource; the core only checks that it exists.
    Leaf { address: String },
    Computed(Computed),
}

#[derive(Debug)]
pub struct Node {
    pub(crate) identifier: String,
    /// Reverse edges: every node that declared this one as a dependency, in
    /// registration order. Never deduplicated, never shrunk.
    pub(crate) downstream: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn downstream(&self) -> &[NodeId] {
        &self.downstream
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn as_computed(&self) -> Option<&Computed> {
        match &self.kind {
            NodeKind::Computed(computed) => Some(computed),
            NodeKind::Leaf { .. } => None,
        }
    }
}
