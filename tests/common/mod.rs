#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use memodag::config::EngineConfig;
use memodag::dag::Graph;
use tempfile::TempDir;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// A scratch directory holding the cache and any leaf inputs of one test.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        init_tracing();
        Self {
            dir: tempfile::tempdir().expect("creating temp dir"),
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    pub fn graph(&self) -> Graph {
        Graph::new(EngineConfig::with_cache_dir(self.cache_dir()))
    }

    /// Write an input file and return its address for a leaf node.
    pub fn input(&self, name: &str, contents: &str) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("writing input file");
        path.to_string_lossy().into_owned()
    }
}
