//! # stockroom-store
//!
//! The document collection behind the Stockroom tools.
//!
//! Every backend implements [`DocumentStore`] with the same filter semantics
//! (see [`stockroom_core::document`]): the in-memory store evaluates filters
//! directly, the PostgreSQL store translates them into JSONB predicates.
//!
//! | `DATABASE_URI` | Backend |
//! |----------------|---------|
//! | `memory://` | [`MemoryStore`] |
//! | `postgres://...`, `postgresql://...` | [`PostgresStore`] |

use async_trait::async_trait;
use std::sync::Arc;
use stockroom_core::{Document, StoreConfig};

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Outcome of an `update_one` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents selected by the filter (0 or 1).
    pub matched_count: u64,
    /// Documents whose content actually changed (0 or 1).
    pub modified_count: u64,
}

/// A collection of schema-flexible documents.
///
/// Documents leave the store with `_id` rendered as a string.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the collection this handle operates on.
    fn collection(&self) -> &str;

    /// All documents matching `filter`, in insertion order.
    async fn find(&self, filter: &Document) -> Result<Vec<Document>, StoreError>;

    /// First document matching `filter`.
    async fn find_one(&self, filter: &Document) -> Result<Option<Document>, StoreError>;

    /// Insert a document and return its identifier.
    ///
    /// A caller-supplied `_id` is kept (as a string); otherwise one is generated.
    async fn insert_one(&self, document: Document) -> Result<String, StoreError>;

    /// Delete the first document matching `filter`. Returns the deleted count.
    async fn delete_one(&self, filter: &Document) -> Result<u64, StoreError>;

    /// Merge `fields` into the first document matching `filter`.
    async fn update_one(
        &self,
        filter: &Document,
        fields: &Document,
    ) -> Result<UpdateResult, StoreError>;

    /// Number of documents matching `filter`.
    async fn count_documents(&self, filter: &Document) -> Result<u64, StoreError>;

    /// Release backend resources. Further calls may fail.
    async fn close(&self);
}

/// Open the store selected by `config.database_uri`.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    let uri = config.database_uri.trim();

    if uri.starts_with("memory://") {
        tracing::info!(collection = %config.collection, "Using in-memory document store");
        return Ok(Arc::new(MemoryStore::new(&config.collection)));
    }

    if uri.starts_with("postgres://") || uri.starts_with("postgresql://") {
        let store = PostgresStore::connect(uri, &config.collection).await?;
        tracing::info!(collection = %config.collection, "Connected to PostgreSQL document store");
        return Ok(Arc::new(store));
    }

    let scheme = uri.split("://").next().unwrap_or_default();
    Err(StoreError::Configuration(format!(
        "unsupported database URI scheme '{}' (expected memory:// or postgres://)",
        scheme
    )))
}

/// Generate a fresh document identifier.
pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_open_memory_store() {
        let config = StoreConfig {
            database_uri: "memory://".to_string(),
            collection: "products".to_string(),
        };
        let store = open_store(&config).await.unwrap();
        assert_eq!(store.collection(), "products");

        let product = json!({"nombre": "X"}).as_object().cloned().unwrap();
        store.insert_one(product).await.unwrap();
        assert_eq!(store.count_documents(&Document::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_scheme_rejected() {
        let config = StoreConfig {
            database_uri: "mongodb://localhost:27017".to_string(),
            collection: "products".to_string(),
        };
        let err = open_store(&config).await.err().unwrap();
        assert!(matches!(err, StoreError::Configuration(msg) if msg.contains("mongodb")));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = new_document_id();
        let b = new_document_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
