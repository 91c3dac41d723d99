//! Persistent key-value capability.
//!
//! The engine only ever sees the [`KeyValueStore`] trait, so tests run against
//! [`MemoryStore`] and the binary uses [`JsonFileStore`]. Persistence is best
//! effort: read problems fall back to defaults and write problems are logged.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const SETTINGS_KEY: &str = "blamegame.settings";
pub const PLAYERS_KEY: &str = "blamegame.players";
pub const PLAYED_HISTORY_KEY: &str = "blamegame.played_history";
pub const BLAME_LOG_KEY: &str = "blamegame.blame_log";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value);
}

/// Read a typed value, falling back to `T::default()` when missing or malformed
pub fn load_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.get(key) {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!("Stored value for {} is malformed ({}), using default", key, e);
            T::default()
        }),
        None => T::default(),
    }
}

pub fn save<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(value) => store.set(key, value),
        Err(e) => tracing::error!("Failed to serialize {}: {}", key, e),
    }
}

/// In-memory store, used in tests and when no store path is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
    }
}

/// Store backed by a single JSON object on disk, written through on every `set`
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the store, starting empty if the file is missing or unreadable
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!("Ignoring corrupt store file {}: {}", path.display(), e);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                tracing::warn!("Failed to read store file {}: {}", path.display(), e);
                Map::new()
            }
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    fn flush(&self, values: &Map<String, Value>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(values)?;
        // write to a sibling file first so a crash never leaves half a document
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        if let Err(e) = self.flush(&values) {
            tracing::warn!("Failed to persist {} to {}: {}", key, self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameSettings;

    #[test]
    fn test_load_missing_key_returns_default() {
        let store = MemoryStore::new();
        let settings: GameSettings = load_or_default(&store, SETTINGS_KEY);
        assert_eq!(settings, GameSettings::default());
    }

    #[test]
    fn test_load_malformed_value_returns_default() {
        let store = MemoryStore::new();
        store.set(PLAYERS_KEY, serde_json::json!({"not": "a list"}));
        let players: Vec<crate::types::Player> = load_or_default(&store, PLAYERS_KEY);
        assert!(players.is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFileStore::open(&path);
        let settings = GameSettings {
            category_count: 2,
            ..GameSettings::default()
        };
        save(&store, SETTINGS_KEY, &settings);

        let reopened = JsonFileStore::open(&path);
        let loaded: GameSettings = load_or_default(&reopened, SETTINGS_KEY);
        assert_eq!(loaded.category_count, 2);
    }

    #[test]
    fn test_file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ definitely not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(store.get(SETTINGS_KEY).is_none());
    }
}
