// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable that overrides `[cache].directory`.
pub const CACHE_DIR_ENV: &str = "MEMODAG_CACHE_DIR";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [cache]
/// directory = "build/cache"
/// cascade_on_miss = false
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Cache store settings from `[cache]`.
    #[serde(default)]
    pub cache: CacheSection,
}

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Directory holding one file per computed node. Created on first write.
    #[serde(default = "default_cache_directory")]
    pub directory: PathBuf,

    /// When true, a cache miss invalidates everything downstream of the
    /// missing node before it is recomputed.
    #[serde(default)]
    pub cascade_on_miss: bool,
}

fn default_cache_directory() -> PathBuf {
    PathBuf::from("cache")
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            cascade_on_miss: false,
        }
    }
}

impl EngineConfig {
    /// Config with every default except the cache directory.
    pub fn with_cache_dir(directory: impl AsRef<Path>) -> Self {
        Self {
            cache: CacheSection {
                directory: directory.as_ref().to_path_buf(),
                ..CacheSection::default()
            },
        }
    }

    /// Apply `MEMODAG_CACHE_DIR` on top of whatever was loaded.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
            self.cache.directory = PathBuf::from(dir);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.cache.directory, PathBuf::from("cache"));
        assert!(!cfg.cache.cascade_on_miss);
    }

    #[test]
    fn cache_section_is_read() {
        let cfg: EngineConfig = toml::from_str(
            r#"
            [cache]
            directory = "out/slots"
            cascade_on_miss = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.cache.directory, PathBuf::from("out/slots"));
        assert!(cfg.cache.cascade_on_miss);
    }

    // The only test in this binary that touches MEMODAG_CACHE_DIR.
    #[test]
    fn env_override_replaces_directory_unless_empty() {
        let base = EngineConfig::with_cache_dir("from-file");

        unsafe { std::env::set_var(CACHE_DIR_ENV, "from-env") };
        let overridden = base.clone().with_env_overrides();

        unsafe { std::env::set_var(CACHE_DIR_ENV, "") };
        let empty = base.clone().with_env_overrides();

        unsafe { std::env::remove_var(CACHE_DIR_ENV) };
        let unset = base.with_env_overrides();

        assert_eq!(overridden.cache.directory, PathBuf::from("from-env"));
        assert_eq!(empty.cache.directory, PathBuf::from("from-file"));
        assert_eq!(unset.cache.directory, PathBuf::from("from-file"));
    }
}
