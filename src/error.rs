// Error taxonomy for the tracker core
// Validation failures surface to the triggering action only; storage
// corruption is recovered by the caller of `Storage::try_load`, backend
// failures never are.

use thiserror::Error;

/// Bad user input rejected at the mutation boundary. No state changes when
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("description must not be empty")]
    EmptyDescription,

    #[error("amount must be a finite number greater than 0 (got {0})")]
    InvalidAmount(f64),

    #[error("category name must not be empty")]
    EmptyName,

    #[error("no category selected")]
    NoCategory,

    #[error("invalid calendar limits: need 0 < low < medium (got low={low}, medium={medium})")]
    InvalidThresholds { low: f64, medium: f64 },
}

/// Failure of the durable key-value backend itself.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(#[from] rusqlite::Error),

    #[error("failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A persisted payload that could not be read back as the expected shape.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("corrupt payload under key '{key}': {reason}")]
pub struct CorruptStorage {
    pub key: String,
    pub reason: String,
}

/// Why `Storage::try_load` produced no value.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The store could not be read. Nothing is known about the payload.
    #[error(transparent)]
    Backend(#[from] StorageError),

    #[error(transparent)]
    Corrupt(#[from] CorruptStorage),
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("category already exists: {0}")]
    DuplicateCategory(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("no transactions to export")]
    NothingToExport,

    #[error("export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
