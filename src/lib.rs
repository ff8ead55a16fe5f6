// src/lib.rs

//! Lazy, disk-backed memoization for pipelines expressed as a DAG of tasks.
//!
//! ```no_run
//! use memodag::config::EngineConfig;
//! use memodag::dag::{Graph, NO_NAMED};
//!
//! # fn main() -> memodag::errors::Result<()> {
//! let mut graph = Graph::new(EngineConfig::default());
//! let raw = graph.add_leaf("data/raw.csv");
//! let rows = graph.task(
//!     "rows",
//!     |args| {
//!         let path: String = args.arg(0)?;
//!         Ok(std::fs::read_to_string(path)?.lines().count())
//!     },
//!     &[raw],
//!     NO_NAMED,
//! )?;
//!
//! let count: usize = graph.resolve_as(rows)?; // computed, then cached
//! let again: usize = graph.resolve_as(rows)?; // read back from cache/rows.json
//! assert_eq!(count, again);
//!
//! graph.invalidate(raw, false)?; // drops rows.json and everything after it
//! # Ok(())
//! # }
//! ```
//!
//! The `memodag` binary only inspects and prunes a cache directory; task
//! functions live in the code that builds the graph.

pub mod cache;
pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod logging;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::cli::{CliArgs, Command};
use crate::config::{EngineConfig, load_or_default, validate_config};

/// High-level entry point used by `main.rs`; command output goes to stdout.
pub fn run(args: CliArgs) -> Result<()> {
    let stdout = std::io::stdout();
    run_with_output(args, &mut stdout.lock())
}

/// Like [`run`], writing command output to `out`.
///
/// This wires together:
/// - config loading (file, then environment, then `--cache-dir`)
/// - the cache store
/// - the selected subcommand
pub fn run_with_output<W: Write>(args: CliArgs, out: &mut W) -> Result<()> {
    let cfg = resolve_config(&args)?;
    let store = CacheStore::from_section(&cfg.cache);
    debug!(root = ?store.root(), "using cache directory");

    match args.command {
        Command::List => {
            for slot in store.list_slots()? {
                writeln!(out, "{slot}")?;
            }
        }
        Command::Show { identifier } => {
            let value = store
                .load(&identifier)
                .with_context(|| format!("reading slot '{identifier}'"))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        Command::Remove { identifiers } => {
            for identifier in identifiers {
                if store.remove(&identifier)? {
                    writeln!(out, "removed {identifier}")?;
                } else {
                    writeln!(out, "not cached: {identifier}")?;
                }
            }
        }
        Command::Clear => {
            let removed = clear(&store)?;
            info!(removed, "cleared cache");
            writeln!(out, "removed {removed} slot(s)")?;
        }
    }

    Ok(())
}

/// Build the effective config: file (or defaults), environment, CLI flag.
fn resolve_config(args: &CliArgs) -> Result<EngineConfig> {
    let mut cfg = load_or_default(args.config_path())?.with_env_overrides();
    if let Some(dir) = &args.cache_dir {
        cfg.cache.directory = PathBuf::from(dir);
    }
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Remove every slot in the store, returning how many were deleted.
fn clear(store: &CacheStore) -> Result<usize> {
    let mut removed = 0;
    for slot in store.list_slots()? {
        if store.remove(&slot)? {
            removed += 1;
        }
    }
    Ok(removed)
}
