// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `memodag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "memodag",
    version,
    about = "Inspect and prune the on-disk cache of a memodag pipeline.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `memodag.toml` in the current working directory. A missing
    /// file means "use defaults".
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Override `[cache].directory` (and `MEMODAG_CACHE_DIR`).
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MEMODAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every cache slot.
    List,
    /// Print the decoded value stored in a slot.
    Show {
        identifier: String,
    },
    /// Delete the given slots. Absent slots are reported, not an error.
    Remove {
        #[arg(required = true)]
        identifiers: Vec<String>,
    },
    /// Delete every slot in the cache.
    Clear,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    /// The `--config` path, or [`default_config_path`] when not given.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(default_config_path)
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
