//! Core error types for focusquest-core.
//!
//! This module defines the error hierarchy using thiserror. Storage failures,
//! uninitialized users and catalog/level-curve misconfiguration are kept
//! apart so callers can tell a retryable failure from a programming error.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for focusquest-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Operation on a user that has no progress or achievement rows yet
    #[error("User '{user_id}' is not initialized")]
    NotInitialized { user_id: String },

    /// Achievement catalog or level curve misconfiguration
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The activity event id was already recorded for this user
    #[error("Activity event {event_id} was already recorded for user '{user_id}'")]
    DuplicateEvent { user_id: String, event_id: Uuid },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored row could not be decoded
    #[error("Corrupt {entity} record: {message}")]
    Corrupt {
        entity: &'static str,
        message: String,
    },

    /// A writer panicked while holding the store lock
    #[error("Store lock poisoned")]
    Poisoned,

    /// Write rejected by the backing store
    #[error("Write failed: {0}")]
    WriteFailed(String),
}

/// Achievement catalog and level curve errors.
///
/// These are startup errors: they are raised when the engine is built,
/// never in the middle of processing an activity event.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// An achievement threshold that can never be evaluated meaningfully
    #[error("Invalid threshold for '{achievement_type}': {message}")]
    InvalidThreshold {
        achievement_type: String,
        message: String,
    },

    /// Two catalog entries share the same type key
    #[error("Duplicate achievement type '{0}'")]
    DuplicateType(String),

    /// The level curve is not monotonically increasing
    #[error("Invalid level curve: {0}")]
    InvalidLevelCurve(String),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Date string not in `YYYY-MM-DD` form
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// User ids must be non-empty
    #[error("User id must not be empty")]
    EmptyUserId,

    /// Achievement type not present in the catalog
    #[error("Unknown achievement type '{0}'")]
    UnknownAchievement(String),

    /// Achievement type is driven by counters and cannot be unlocked directly
    #[error("Achievement '{0}' is unlocked by activity counters, not out of band")]
    NotSpecial(String),
}

/// Notification delivery errors. Logged by the orchestrator, never returned.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The delivery channel is gone
    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),

    /// Delivery attempted and failed
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _msg) => {
                if failure.code == rusqlite::ErrorCode::DatabaseLocked
                    || failure.code == rusqlite::ErrorCode::DatabaseBusy
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

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rusqlite_errors_become_storage_errors() {
        let err: CoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, CoreError::Storage(StorageError::QueryFailed(_))));
    }

    #[test]
    fn not_initialized_names_the_user() {
        let err = CoreError::NotInitialized {
            user_id: "ada".to_string(),
        };
        assert_eq!(err.to_string(), "User 'ada' is not initialized");
    }
}
