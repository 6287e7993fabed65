//! SQLite-backed key-value store.
//!
//! Each session snapshot is stored as a JSON text blob under a fixed key in
//! a single `kv` table.

use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

use super::{data_dir, KvStore};
use crate::error::StorageError;

/// File name of the database inside the data directory.
pub const DB_FILE: &str = "muriell.db";

/// SQLite database holding session snapshots.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at `<data_dir>/muriell.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join(DB_FILE))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a raw value from the kv table.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a raw value in the kv table.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove every stored snapshot.
    pub fn clear(&self) -> Result<usize, StorageError> {
        Ok(self.conn.execute("DELETE FROM kv", [])?)
    }
}

impl KvStore for SqliteStore {
    fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError> {
        self.kv_set(key, &value.to_string())?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let Some(raw) = self.kv_get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = SqliteStore::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn json_values_round_trip() {
        let db = SqliteStore::open_memory().unwrap();
        let value = serde_json::json!({"xp": 450, "nested": [1, 2, 3]});
        db.save("k", &value).unwrap();
        assert_eq!(db.load("k").unwrap(), Some(value));
    }

    #[test]
    fn non_json_value_is_corrupt() {
        let db = SqliteStore::open_memory().unwrap();
        db.kv_set("k", "{not json").unwrap();
        assert!(matches!(db.load("k"), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE);
        {
            let db = SqliteStore::open_at(&path).unwrap();
            db.save("k", &serde_json::json!(7)).unwrap();
        }
        let db = SqliteStore::open_at(&path).unwrap();
        assert_eq!(db.load("k").unwrap(), Some(serde_json::json!(7)));
        assert_eq!(db.clear().unwrap(), 1);
        assert!(db.load("k").unwrap().is_none());
    }
}
