// src/config/validate.rs

use crate::config::model::EngineConfig;
use crate::errors::{MemodagError, Result};

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `[cache].directory` is not empty
/// - `[cache].directory` does not name an existing regular file
///
/// It does **not** create the directory; that happens lazily on first write.
pub fn validate_config(cfg: &EngineConfig) -> Result<()> {
    let dir = &cfg.cache.directory;

    if dir.as_os_str().is_empty() {
        return Err(MemodagError::Config(
            "[cache].directory must not be empty".to_string(),
        ));
    }

    if dir.exists() && !dir.is_dir() {
        return Err(MemodagError::Config(format!(
            "[cache].directory {:?} exists but is not a directory",
            dir
        )));
    }

    Ok(())
}
