//! In-memory document store.

use crate::error::StoreError;
use crate::{DocumentStore, UpdateResult, new_document_id};
use async_trait::async_trait;
use serde_json::Value;
use stockroom_core::document::{self, Document, ID_FIELD};
use tokio::sync::RwLock;

/// Document store held in process memory.
///
/// Documents are kept in insertion order; every stored document carries a
/// string `_id`.
#[derive(Debug)]
pub struct MemoryStore {
    collection: String,
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty collection.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            documents: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn find(&self, filter: &Document) -> Result<Vec<Document>, StoreError> {
        document::validate_filter(filter)?;
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|doc| document::matches(doc, filter))
            .cloned()
            .collect())
    }

    async fn find_one(&self, filter: &Document) -> Result<Option<Document>, StoreError> {
        document::validate_filter(filter)?;
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|doc| document::matches(doc, filter))
            .cloned())
    }

    async fn insert_one(&self, mut doc: Document) -> Result<String, StoreError> {
        let id = match doc.get(ID_FIELD) {
            Some(value) => document::id_to_string(value),
            None => new_document_id(),
        };
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let mut documents = self.documents.write().await;
        if documents
            .iter()
            .any(|existing| existing.get(ID_FIELD).and_then(Value::as_str) == Some(id.as_str()))
        {
            return Err(StoreError::DuplicateId(id));
        }
        documents.push(doc);

        tracing::debug!(collection = %self.collection, id = %id, "Inserted document");
        Ok(id)
    }

    async fn delete_one(&self, filter: &Document) -> Result<u64, StoreError> {
        document::validate_filter(filter)?;
        let mut documents = self.documents.write().await;
        match documents
            .iter()
            .position(|doc| document::matches(doc, filter))
        {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_one(
        &self,
        filter: &Document,
        fields: &Document,
    ) -> Result<UpdateResult, StoreError> {
        document::validate_filter(filter)?;
        document::validate_update(fields)?;

        let mut documents = self.documents.write().await;
        let Some(target) = documents
            .iter_mut()
            .find(|doc| document::matches(doc, filter))
        else {
            return Ok(UpdateResult::default());
        };

        // Apply to a copy so a failing path leaves the stored document intact.
        let mut updated = target.clone();
        let changed = document::apply_set(&mut updated, fields)?;
        if changed {
            *target = updated;
        }

        Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(changed),
        })
    }

    async fn count_documents(&self, filter: &Document) -> Result<u64, StoreError> {
        document::validate_filter(filter)?;
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|doc| document::matches(doc, filter))
            .count() as u64)
    }

    async fn close(&self) {
        tracing::debug!(collection = %self.collection, "Closing in-memory store");
    }
}
