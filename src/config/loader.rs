// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::model::EngineConfig;
use crate::config::validate::validate_config;

/// Load a configuration file from a given path and return the raw `EngineConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: EngineConfig = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file yields the defaults.
///
/// A config file is optional: most pipelines are happy with `./cache`.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(?path, "no config file; using defaults");
        let config = EngineConfig::default();
        validate_config(&config)?;
        return Ok(config);
    }
    load_and_validate(path)
}

/// `memodag.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("memodag.toml")
}
