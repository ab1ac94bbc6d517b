//! Settings persistence boundary.
//!
//! The registry is stored as one JSON value under a well-known key. The store
//! itself is an injected collaborator with plain get/set semantics; registry
//! operations always read the full library list, mutate in memory, and write
//! the full list back. Concurrent writers from independent processes can race
//! on that read-modify-write cycle; callers wanting stronger guarantees must
//! serialize access themselves.

use crate::library::Library;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Storage key holding the full library list.
///
/// Stable literal shared with already-deployed hubs; do not rename.
pub const LIBRARIES_KEY: &str = "scryhub.providers";

/// Key/value persistence for hub settings.
pub trait SettingsStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Load the registered libraries, empty when none were ever saved.
pub fn load_libraries(store: &dyn SettingsStore) -> Result<Vec<Library>> {
    match store.get(LIBRARIES_KEY)? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(Vec::new()),
    }
}

/// Persist the full library list.
pub fn save_libraries(store: &dyn SettingsStore, libraries: &[Library]) -> Result<()> {
    store.set(LIBRARIES_KEY, serde_json::to_value(libraries)?)
}

/// In-memory settings store.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Settings stored as one pretty-printed JSON object in a file.
///
/// The file maps keys to values; a missing file reads as empty.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<HashMap<String, Value>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut all = self.read_all()?;
        Ok(all.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&all)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
