//! Core error types for muriell-core.
//!
//! Not-found and validation failures are kept apart so callers can treat a
//! stale id as a no-op while still rejecting malformed input.

use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskStatus;

/// Core error type for muriell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Lookup or state-transition errors on tasks and habits
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Input rejected before an entity was constructed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the task ledger and habit tracker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// No task with this id
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// No habit section with this id
    #[error("Habit section not found: {0}")]
    SectionNotFound(String),

    /// No habit with this id inside the section
    #[error("Habit '{habit_id}' not found in section '{section_id}'")]
    HabitNotFound {
        section_id: String,
        habit_id: String,
    },

    /// Status change not allowed by the task state machine
    #[error("Invalid transition for task {id}: {from:?} -> {to:?}")]
    InvalidTransition {
        id: String,
        from: TaskStatus,
        to: TaskStatus,
    },
}

impl LedgerError {
    /// True for the not-found family, which callers may treat as a no-op.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::TaskNotFound(_)
                | LedgerError::SectionNotFound(_)
                | LedgerError::HabitNotFound { .. }
        )
    }
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field was empty or whitespace
    #[error("'{0}' must not be empty")]
    EmptyField(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Stored value could not be encoded or decoded
    #[error("Corrupt value under '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
