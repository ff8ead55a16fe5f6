// src/dag/graph.rs

use petgraph::dot::{Config, Dot};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::CacheStore;
use crate::config::EngineConfig;
use crate::dag::node::{Computed, Node, NodeId, NodeKind, TaskArgs, TaskFn};
use crate::errors::{MemodagError, Result};

/// Suffix appended to a task name to form its cache-slot identifier.
pub const SLOT_EXTENSION: &str = ".json";

/// Arena of nodes connected by mirrored edges.
///
/// Upstream edges live on each computed node ("what I need"); downstream
/// edges live on every node ("who needs me"). Both are stored as indices,
/// so the arena is the only owner.
///
/// A node may only name dependencies that already exist, so the graph is
/// acyclic by construction. Identifier uniqueness is *not* checked: two tasks
/// with the same identifier share one cache slot.
#[derive(Debug)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) store: CacheStore,
    pub(crate) cascade_on_miss: bool,
}

impl Graph {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            nodes: Vec::new(),
            store: CacheStore::from_section(&config.cache),
            cascade_on_miss: config.cache.cascade_on_miss,
        }
    }

    /// Add a node for an externally produced file at `address`.
    pub fn add_leaf(&mut self, address: impl Into<String>) -> NodeId {
        let address = address.into();
        let id = NodeId(self.nodes.len());

        debug!(node = id.0, %address, "added leaf node");
        self.nodes.push(Node {
            identifier: address.clone(),
            downstream: Vec::new(),
            kind: NodeKind::Leaf { address },
        });
        id
    }

    /// Add a computed node and register it as a dependent of each upstream.
    ///
    /// Registration order is positional dependencies, then named ones, each
    /// group in declaration order. A node listed twice is registered twice.
    /// Named keys must be unique.
    pub fn add_computed<F, K>(
        &mut self,
        identifier: impl Into<String>,
        function: F,
        positional: &[NodeId],
        named: impl IntoIterator<Item = (K, NodeId)>,
    ) -> Result<NodeId>
    where
        F: Fn(&TaskArgs) -> anyhow::Result<Value> + 'static,
        K: Into<String>,
    {
        let identifier = identifier.into();
        let mut upstream_named: Vec<(String, NodeId)> = Vec::new();
        for (key, up) in named {
            let key = key.into();
            if upstream_named.iter().any(|(k, _)| *k == key) {
                return Err(MemodagError::DuplicateName {
                    identifier,
                    name: key,
                });
            }
            upstream_named.push((key, up));
        }

        let named_ids = upstream_named.iter().map(|(_, id)| *id);
        for up in positional.iter().copied().chain(named_ids) {
            self.node(up)?;
        }

        let id = NodeId(self.nodes.len());
        let computed = Computed {
            function: Box::new(function) as TaskFn,
            upstream_positional: positional.to_vec(),
            upstream_named,
        };

        for up in computed.upstream() {
            self.nodes[up.0].downstream.push(id);
        }

        debug!(
            node = id.0,
            identifier = %identifier,
            upstream = computed.upstream().count(),
            "added computed node"
        );
        self.nodes.push(Node {
            identifier,
            downstream: Vec::new(),
            kind: NodeKind::Computed(computed),
        });
        Ok(id)
    }

    /// Register a task under `name`; its slot identifier is
    /// `name` + [`SLOT_EXTENSION`].
    pub fn require<F, K>(
        &mut self,
        name: &str,
        function: F,
        positional: &[NodeId],
        named: impl IntoIterator<Item = (K, NodeId)>,
    ) -> Result<NodeId>
    where
        F: Fn(&TaskArgs) -> anyhow::Result<Value> + 'static,
        K: Into<String>,
    {
        self.add_computed(slot_identifier(name), function, positional, named)
    }

    /// Like [`Graph::require`], for functions returning any `Serialize` type.
    pub fn task<T, F, K>(
        &mut self,
        name: &str,
        function: F,
        positional: &[NodeId],
        named: impl IntoIterator<Item = (K, NodeId)>,
    ) -> Result<NodeId>
    where
        T: Serialize + 'static,
        F: Fn(&TaskArgs) -> anyhow::Result<T> + 'static,
        K: Into<String>,
    {
        self.require(name, to_json(function), positional, named)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(MemodagError::UnknownNode(id))
    }

    pub fn identifier(&self, id: NodeId) -> Result<&str> {
        Ok(self.node(id)?.identifier())
    }

    pub fn downstream_of(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(id)?.downstream())
    }

    /// Upstream dependencies of a node; empty for leaves.
    pub fn upstream_of(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .node(id)?
            .as_computed()
            .map(|c| c.upstream().collect())
            .unwrap_or_default())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Graphviz rendering, one edge per downstream registration.
    pub fn to_dot(&self) -> String {
        let mut graph = petgraph::Graph::<&str, &str>::new();
        let indices: Vec<_> = self
            .nodes
            .iter()
            .map(|n| graph.add_node(n.identifier.as_str()))
            .collect();

        for (i, node) in self.nodes.iter().enumerate() {
            for child in &node.downstream {
                graph.add_edge(indices[i], indices[child.0], "");
            }
        }

        format!("{}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
    }
}

fn slot_identifier(name: &str) -> String {
    format!("{name}{SLOT_EXTENSION}")
}

fn to_json<T, F>(function: F) -> impl Fn(&TaskArgs) -> anyhow::Result<Value> + 'static
where
    T: Serialize + 'static,
    F: Fn(&TaskArgs) -> anyhow::Result<T> + 'static,
{
    move |args| Ok(serde_json::to_value(function(args)?)?)
}
