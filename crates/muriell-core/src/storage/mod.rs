mod config;
pub mod database;
pub mod persistence;

pub use config::{Config, LoggingConfig, NotificationsConfig};
pub use database::SqliteStore;
pub use persistence::PersistenceWorker;

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StorageError;

/// Key holding the reputation snapshot.
pub const STATS_KEY: &str = "muriell_stats";
/// Key holding the task list.
pub const TASKS_KEY: &str = "muriell_tasks";
/// Key holding the habit sections.
pub const HABITS_KEY: &str = "muriell_habits";
/// Key holding the per-domain usage log.
pub const USAGE_KEY: &str = "muriell_usage_log";

/// Returns the data directory, creating it if needed.
///
/// `MURIELL_DATA_DIR` wins when set. Otherwise `~/.config/muriell[-dev]/`
/// based on `MURIELL_ENV` (set `MURIELL_ENV=dev` for the development copy).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("MURIELL_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MURIELL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("muriell-dev")
            } else {
                base_dir.join("muriell")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Named JSON blobs that survive a restart.
pub trait KvStore: Send {
    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError>;
    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;
}

/// Load and decode a typed value.
///
/// # Errors
/// Returns `StorageError::Corrupt` if the stored JSON does not fit `T`.
pub fn load_typed<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.load(key)? {
        None => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            }),
    }
}

/// Process-local store, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Locked)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Locked)?;
        entries
            .get(key)
            .map(|raw| {
                serde_json::from_str(raw).map_err(|e| StorageError::Corrupt {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }
}

impl<S: KvStore + Sync + ?Sized> KvStore for std::sync::Arc<S> {
    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError> {
        (**self).save(key, value)
    }

    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        (**self).load(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reputation::ReputationState;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert!(store.load(STATS_KEY).unwrap().is_none());
        let value = serde_json::to_value(ReputationState::seed()).unwrap();
        store.save(STATS_KEY, &value).unwrap();
        let loaded: ReputationState = load_typed(&store, STATS_KEY).unwrap().unwrap();
        assert_eq!(loaded, ReputationState::seed());
    }

    #[test]
    fn load_typed_reports_corrupt_values() {
        let store = MemoryStore::new();
        store
            .save(STATS_KEY, &serde_json::json!({"xp": "lots"}))
            .unwrap();
        let err = load_typed::<ReputationState>(&store, STATS_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
