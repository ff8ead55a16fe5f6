// src/dag/invalidate.rs

//! Cache invalidation with optional cascade to dependents.
//!
//! A cascade visits each dependent once, however many edges or paths lead
//! to it, so a diamond-heavy graph costs time linear in its edges.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::dag::graph::Graph;
use crate::dag::node::{Node, NodeId, NodeKind};
use crate::errors::Result;

impl Graph {
    /// Drop a node's cache slot and, unless `keep_downstream` is set, the
    /// slots of everything that transitively depends on it.
    ///
    /// Leaves own no slot; external resources are never deleted. Invalidating
    /// a leaf with `keep_downstream` is therefore a no-op.
    pub fn invalidate(&self, id: NodeId, keep_downstream: bool) -> Result<()> {
        self.drop_slot(self.node(id)?)?;

        if keep_downstream {
            return Ok(());
        }

        self.invalidate_downstream(id)
    }

    /// Cascade to every transitive dependent of `id`, leaving `id` itself alone.
    pub(crate) fn invalidate_downstream(&self, id: NodeId) -> Result<()> {
        let mut visited = HashSet::new();
        let mut pending = self.downstream_of(id)?.to_vec();

        while let Some(child) = pending.pop() {
            if !visited.insert(child) {
                continue;
            }
            trace!(from = id.index(), to = child.index(), "cascading invalidation");
            self.drop_slot(self.node(child)?)?;
            pending.extend_from_slice(self.downstream_of(child)?);
        }
        Ok(())
    }

    fn drop_slot(&self, node: &Node) -> Result<()> {
        if let NodeKind::Computed(_) = node.kind() {
            if self.store.remove(node.identifier())? {
                debug!(slot = %node.identifier(), "invalidated cache slot");
            }
        }
        Ok(())
    }
}
