//! Key-value persistence for settings

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::error::{SettingsError, SettingsResult};

/// Key the system settings are stored under
pub const SYSTEM_CONFIG_KEY: &str = "system";

pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> SettingsResult<Option<Value>>;
    fn upsert(&self, key: &str, value: Value) -> SettingsResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> SettingsResult<Option<Value>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn upsert(&self, key: &str, value: Value) -> SettingsResult<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// All keys in one JSON object on disk
///
/// A missing file reads as an empty store; the file and its directory are
/// created on the first upsert.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> SettingsResult<BTreeMap<String, Value>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        serde_json::from_str(&content).map_err(|source| SettingsError::StoreParse {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::StoreIo {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> SettingsResult<Option<Value>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn upsert(&self, key: &str, value: Value) -> SettingsResult<()> {
        let _guard = self.lock.lock();
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let content = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, content).map_err(|source| self.io_error(source))
    }
}
