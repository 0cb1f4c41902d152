//! Error types for the store crate.

use stockroom_core::DocumentError;
use thiserror::Error;

/// Errors that can occur in a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection string or collection name is unusable.
    #[error("invalid store configuration: {0}")]
    Configuration(String),

    /// Filter or update was rejected before reaching the backend.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DocumentError),

    /// A document with this `_id` already exists.
    #[error("a document with _id '{0}' already exists")]
    DuplicateId(String),

    /// Backend failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored document could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
