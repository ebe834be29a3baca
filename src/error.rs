//! Error types for the Melete progress engine
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.

use crate::types::{ItemId, PlaylistId};
use thiserror::Error;

/// Main error type for Melete operations
#[derive(Error, Debug)]
pub enum MeleteError {
    /// Referenced learning item does not exist in the playlist catalog
    #[error("Playlist item not found: {0}")]
    ItemNotFound(ItemId),

    /// Referenced playlist does not exist in the playlist catalog
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Input rejected before any mutation took place
    #[error("Validation error: {0}")]
    Validation(String),

    /// Concurrent-write contention detected by the storage layer
    ///
    /// An implementation artifact, not a domain error; the recorder
    /// retries these internally.
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl MeleteError {
    /// Whether this error is a client-facing "not found" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MeleteError::ItemNotFound(_) | MeleteError::PlaylistNotFound(_)
        )
    }
}

/// Result type alias for Melete operations
pub type Result<T> = std::result::Result<T, MeleteError>;

/// Convert anyhow::Error to MeleteError
impl From<anyhow::Error> for MeleteError {
    fn from(err: anyhow::Error) -> Self {
        MeleteError::Other(err.to_string())
    }
}
