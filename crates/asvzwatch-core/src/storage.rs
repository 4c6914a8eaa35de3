//! Durable key-value storage for small JSON blobs.
//!
//! `FileStore` keeps one `<key>.json` file per key in a cache directory and
//! survives restarts. `MemoryStore` lives for the process only and is what
//! tests inject.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::debug;

/// Read-blob / write-blob storage.
pub trait DurableStore {
    /// The stored value, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Replace the stored value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                debug!(key = key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Write then rename so a crash never leaves a half-written blob
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

/// In-process store. `with_quota` rejects writes larger than the quota,
/// the way a browser's local storage does.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            values: Mutex::default(),
            quota: Some(quota),
        }
    }

    /// Seed a value without going through the quota check.
    pub fn insert(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                anyhow::bail!("Storage quota exceeded ({} > {} bytes)", value.len(), quota);
            }
        }
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("Storage lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
