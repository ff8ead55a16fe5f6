// src/dag/eval.rs

//! Pull-based resolution.
//!
//! Resolving a computed node either loads its cache slot (dependencies are
//! not touched, even if they changed since) or recursively resolves every
//! dependency, runs the task function and persists the output. There is no
//! in-memory memo table: the cache store is the only memory.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::dag::graph::Graph;
use crate::dag::node::{Computed, NodeId, NodeKind, TaskArgs};
use crate::errors::{MemodagError, Result};

impl Graph {
    /// Leaf: the referenced resource exists. Computed: its cache slot exists.
    pub fn is_satisfied(&self, id: NodeId) -> Result<bool> {
        let node = self.node(id)?;
        Ok(match node.kind() {
            NodeKind::Leaf { address } => Path::new(address).exists(),
            NodeKind::Computed(_) => self.store.contains(node.identifier()),
        })
    }

    /// Resolve a node's value, computing and caching it on a miss.
    ///
    /// Leaves resolve to their address as a JSON string. Errors from
    /// dependencies are returned unchanged.
    pub fn resolve(&self, id: NodeId) -> Result<Value> {
        let node = self.node(id)?;

        match node.kind() {
            NodeKind::Leaf { address } => {
                if Path::new(address).exists() {
                    Ok(Value::String(address.clone()))
                } else {
                    Err(MemodagError::ResourceMissing {
                        address: address.clone(),
                    })
                }
            }
            NodeKind::Computed(computed) => {
                let identifier = node.identifier();
                if self.store.contains(identifier) {
                    debug!(slot = %identifier, "cache hit");
                    return self.store.load(identifier);
                }

                debug!(slot = %identifier, "cache miss");
                if self.cascade_on_miss {
                    self.invalidate_downstream(id)?;
                }
                self.compute(identifier, computed)
            }
        }
    }

    /// [`Graph::resolve`], decoded into `T`.
    pub fn resolve_as<T: DeserializeOwned>(&self, id: NodeId) -> Result<T> {
        let value = self.resolve(id)?;
        decode(self.identifier(id)?, value)
    }

    /// Force a fresh execution of a computed node.
    ///
    /// The node's own slot is deleted first, along with everything downstream
    /// unless `keep_downstream` is set. Dependencies are resolved normally, so
    /// a stale upstream slot is reused; run that node explicitly to refresh it.
    pub fn run(&self, id: NodeId, keep_downstream: bool) -> Result<Value> {
        let node = self.node(id)?;
        let NodeKind::Computed(computed) = node.kind() else {
            return Err(MemodagError::NotComputed {
                identifier: node.identifier().to_string(),
            });
        };

        self.invalidate(id, keep_downstream)?;
        self.compute(node.identifier(), computed)
    }

    pub fn run_as<T: DeserializeOwned>(&self, id: NodeId, keep_downstream: bool) -> Result<T> {
        let value = self.run(id, keep_downstream)?;
        decode(self.identifier(id)?, value)
    }

    /// Invoke a computed node's function on caller-supplied arguments.
    ///
    /// Neither the cache nor the dependencies are consulted, and nothing is
    /// written.
    pub fn call(&self, id: NodeId, args: &TaskArgs) -> Result<Value> {
        let node = self.node(id)?;
        let NodeKind::Computed(computed) = node.kind() else {
            return Err(MemodagError::NotComputed {
                identifier: node.identifier().to_string(),
            });
        };

        invoke(node.identifier(), computed, args)
    }

    /// Cache-miss path: resolve dependencies, run the function, persist.
    fn compute(&self, identifier: &str, computed: &Computed) -> Result<Value> {
        self.store.prepare()?;

        let positional = computed
            .upstream_positional
            .iter()
            .map(|&up| self.resolve(up))
            .collect::<Result<Vec<_>>>()?;

        let named = computed
            .upstream_named
            .iter()
            .map(|(key, up)| Ok((key.clone(), self.resolve(*up)?)))
            .collect::<Result<Vec<_>>>()?;

        info!(task = %task_name(identifier), "running task");
        let value = invoke(identifier, computed, &TaskArgs::new(positional, named))?;

        self.store.store(identifier, &value)?;
        Ok(value)
    }
}

fn invoke(identifier: &str, computed: &Computed, args: &TaskArgs) -> Result<Value> {
    (computed.function)(args).map_err(|source| MemodagError::Task {
        identifier: identifier.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(identifier: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| MemodagError::Deserialization {
        identifier: identifier.to_string(),
        source,
    })
}

/// Slot identifier without its extension, for log lines.
fn task_name(identifier: &str) -> &str {
    Path::new(identifier)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(identifier)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use serde_json::json;
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::config::EngineConfig;
    use crate::dag::NO_NAMED;

    fn graph_in_tempdir() -> (TempDir, Graph) {
        let dir = tempdir().unwrap();
        let graph = Graph::new(EngineConfig::with_cache_dir(dir.path().join("cache")));
        (dir, graph)
    }

    #[test]
    fn second_resolve_is_served_from_cache() {
        let (_dir, mut g) = graph_in_tempdir();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let n = g
            .require(
                "n",
                move |_| {
                    counter.set(counter.get() + 1);
                    Ok(json!(42))
                },
                &[],
                NO_NAMED,
            )
            .unwrap();

        assert_eq!(g.resolve(n).unwrap(), json!(42));
        assert_eq!(g.resolve(n).unwrap(), json!(42));
        assert_eq!(calls.get(), 1);
        assert!(g.is_satisfied(n).unwrap());
    }

    #[test]
    fn dependencies_feed_positional_and_named_arguments() {
        let (_dir, mut g) = graph_in_tempdir();
        let two = g.task("two", |_| Ok(2), &[], NO_NAMED).unwrap();
        let ten = g.task("ten", |_| Ok(10), &[], NO_NAMED).unwrap();
        let sum = g
            .task(
                "sum",
                |args| {
                    let a: i64 = args.arg(0)?;
                    let b: i64 = args.named_arg("b")?;
                    Ok(a + b)
                },
                &[two],
                [("b", ten)],
            )
            .unwrap();

        assert_eq!(g.resolve_as::<i64>(sum).unwrap(), 12);
        assert!(g.is_satisfied(two).unwrap());
        assert!(g.is_satisfied(ten).unwrap());
    }

    #[test]
    fn named_arguments_arrive_in_declaration_order() {
        let (_dir, mut g) = graph_in_tempdir();
        let one = g.task("one", |_| Ok(1), &[], NO_NAMED).unwrap();
        let two = g.task("two", |_| Ok(2), &[], NO_NAMED).unwrap();
        let keys = g
            .require(
                "keys",
                |args| {
                    let keys: Vec<&str> = args.named.iter().map(|(k, _)| k.as_str()).collect();
                    Ok(json!(keys))
                },
                &[],
                [("zeta", one), ("alpha", two)],
            )
            .unwrap();

        assert_eq!(g.resolve(keys).unwrap(), json!(["zeta", "alpha"]));
    }

    #[test]
    fn cache_hit_does_not_touch_dependencies() {
        let (dir, mut g) = graph_in_tempdir();
        let input = dir.path().join("input.txt");
        std::fs::write(&input, "x").unwrap();

        let leaf = g.add_leaf(input.to_string_lossy());
        let n = g.task("n", |_| Ok("done"), &[leaf], NO_NAMED).unwrap();
        g.resolve(n).unwrap();

        std::fs::remove_file(&input).unwrap();
        assert_eq!(g.resolve_as::<String>(n).unwrap(), "done");
    }

    #[test]
    fn leaf_resolves_to_its_address() {
        let (dir, mut g) = graph_in_tempdir();
        let input = dir.path().join("raw.csv");
        std::fs::write(&input, "a,b").unwrap();
        let address = input.to_string_lossy().to_string();

        let leaf = g.add_leaf(address.clone());
        assert!(g.is_satisfied(leaf).unwrap());
        assert_eq!(g.resolve(leaf).unwrap(), json!(address));
    }

    #[test]
    fn task_failure_is_wrapped_and_nothing_is_cached() {
        let (_dir, mut g) = graph_in_tempdir();
        let n = g
            .require("boom", |_| Err(anyhow::anyhow!("bad input")), &[], NO_NAMED)
            .unwrap();

        let err = g.resolve(n).unwrap_err();
        assert!(matches!(err, MemodagError::Task { ref identifier, .. } if identifier == "boom.json"));
        assert!(!g.is_satisfied(n).unwrap());
    }

    #[test]
    fn call_bypasses_cache() {
        let (_dir, mut g) = graph_in_tempdir();
        let double = g
            .task("double", |args| Ok(args.arg::<i64>(0)? * 2), &[], NO_NAMED)
            .unwrap();

        let args = TaskArgs::new(vec![json!(21)], Vec::new());
        assert_eq!(g.call(double, &args).unwrap(), json!(42));
        assert!(!g.is_satisfied(double).unwrap());
    }

    #[test]
    fn run_and_call_reject_leaves() {
        let (_dir, mut g) = graph_in_tempdir();
        let leaf = g.add_leaf("anything");

        assert!(matches!(g.run(leaf, true), Err(MemodagError::NotComputed { .. })));
        assert!(matches!(
            g.call(leaf, &TaskArgs::default()),
            Err(MemodagError::NotComputed { .. })
        ));
    }

    #[test]
    fn mistyped_resolve_is_a_deserialization_error() {
        let (_dir, mut g) = graph_in_tempdir();
        let n = g.task("text", |_| Ok("abc"), &[], NO_NAMED).unwrap();

        assert!(matches!(
            g.resolve_as::<u32>(n),
            Err(MemodagError::Deserialization { .. })
        ));
    }

    #[test]
    fn task_name_strips_extension() {
        assert_eq!(task_name("train.json"), "train");
        assert_eq!(task_name("plain"), "plain");
    }
}
