//! Error types for parts_inventory

use thiserror::Error;

/// Unified error type for inventory operations.
///
/// Only the store surface can fail; the codec, merge engine, filter and
/// sanitizer degrade gracefully instead of returning errors.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Failed to serialize or parse a stored record
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
