// src/cache/store.rs

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::CacheSection;
use crate::errors::{MemodagError, Result};

/// Subdirectory of the store where slots are staged before being renamed
/// into place. Slots are regular files, so it never shows up as one.
pub const STAGING_DIR: &str = ".staging";

/// Directory-backed slot storage.
///
/// No locking: the store assumes a single writer. Writes land through a
/// staged temporary file and a rename, so a reader never sees a
/// half-written slot.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_section(section: &CacheSection) -> Self {
        Self::new(section.directory.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the store directory exists. Idempotent.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| MemodagError::io(&self.root, e))
    }

    pub fn slot_path(&self, identifier: &str) -> PathBuf {
        self.root.join(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.slot_path(identifier).is_file()
    }

    /// Read and decode a slot.
    pub fn load(&self, identifier: &str) -> Result<Value> {
        let path = self.slot_path(identifier);
        let bytes = fs::read(&path).map_err(|e| MemodagError::io(&path, e))?;

        let value = serde_json::from_slice(&bytes).map_err(|source| {
            MemodagError::Deserialization {
                identifier: identifier.to_string(),
                source,
            }
        })?;

        debug!(slot = %identifier, bytes = bytes.len(), "loaded cache slot");
        Ok(value)
    }

    /// Encode `value` and write it to the slot, replacing any previous content.
    ///
    /// On failure the staged file is removed and the previous slot, if any,
    /// is left untouched.
    pub fn store(&self, identifier: &str, value: &Value) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|source| MemodagError::Serialization {
            identifier: identifier.to_string(),
            source,
        })?;

        let staging = self.root.join(STAGING_DIR);
        fs::create_dir_all(&staging).map_err(|e| MemodagError::io(&staging, e))?;

        let mut staged =
            NamedTempFile::new_in(&staging).map_err(|e| MemodagError::io(&staging, e))?;
        let staged_path = staged.path().to_path_buf();
        staged
            .write_all(&bytes)
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| MemodagError::io(&staged_path, e))?;

        let path = self.slot_path(identifier);
        staged
            .persist(&path)
            .map_err(|e| MemodagError::io(&path, e.error))?;

        debug!(slot = %identifier, bytes = bytes.len(), "stored cache slot");
        Ok(())
    }

    /// Delete a slot. Returns whether anything was removed; an absent slot
    /// is not an error.
    pub fn remove(&self, identifier: &str) -> Result<bool> {
        let path = self.slot_path(identifier);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(slot = %identifier, "removed cache slot");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(MemodagError::io(&path, e)),
        }
    }

    /// Identifiers of every slot currently in the store, sorted. Only regular
    /// files count, so the staging directory is never listed.
    pub fn list_slots(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MemodagError::io(&self.root, e)),
        };

        let mut slots = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MemodagError::io(&self.root, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                slots.push(name.to_string());
            }
        }

        slots.sort();
        Ok(slots)
    }
}
