//! Durable key-value storage for presets.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{PresetError, PresetResult};

/// String key-value storage. One writer at a time is assumed.
pub trait PresetStorage: Send + Sync {
    /// Read the value under `key`, `None` if absent.
    fn load(&self, key: &str) -> PresetResult<Option<String>>;

    /// Overwrite the value under `key`.
    fn save(&self, key: &str, value: &str) -> PresetResult<()>;
}

/// In-memory storage, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        storage
    }
}

impl PresetStorage for MemoryStorage {
    fn load(&self, key: &str) -> PresetResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| PresetError::storage("memory storage poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> PresetResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PresetError::storage("memory storage poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory from `ODET_PRESETS_DIR`, defaulting to `.odet`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("ODET_PRESETS_DIR").unwrap_or_else(|_| ".odet".to_string()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PresetResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PresetError::storage(format!("invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl PresetStorage for JsonFileStorage {
    fn load(&self, key: &str) -> PresetResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> PresetResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;

        // Write-then-rename; readers never see a partial file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        debug!(path = %path.display(), bytes = value.len(), "Persisted presets");
        Ok(())
    }
}
