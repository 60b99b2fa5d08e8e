//! Document store: opaque JSON documents keyed by `(collection, id)`.
//!
//! Writes merge: top-level keys in the incoming object replace stored ones,
//! keys it leaves out are kept. Pipeline code only ever needs equality lookups.

pub mod objects;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

pub use postgres::PgDocumentStore;

pub const TENDERS: &str = "tenders";
pub const BIDS: &str = "bids";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Creates the document or merges `document`'s top-level keys into it.
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StorageError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StorageError>;

    /// Every document whose top-level `field` equals `value`.
    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StorageError>;
}

/// Rejects anything but a JSON object; merging is only defined for objects.
pub(crate) fn ensure_object(document: &Value) -> Result<(), StorageError> {
    if document.is_object() {
        Ok(())
    } else {
        Err(StorageError::InvalidDocument(
            "documents must be JSON objects".to_string(),
        ))
    }
}

/// Shallow merge of `incoming` into `existing`.
pub fn merge_documents(existing: &mut Value, incoming: Value) {
    match (existing.as_object_mut(), incoming) {
        (Some(target), Value::Object(source)) => {
            for (key, value) in source {
                target.insert(key, value);
            }
        }
        (_, incoming) => *existing = incoming,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store used by tests and local runs without Postgres.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StorageError> {
        ensure_object(&document)?;
        let mut documents = self.documents.write().await;
        match documents.get_mut(&(collection.to_string(), id.to_string())) {
            Some(existing) => merge_documents(existing, document),
            None => {
                documents.insert((collection.to_string(), id.to_string()), document);
            }
        }
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StorageError> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StorageError> {
        let documents = self.documents.read().await;
        let mut matches: Vec<(&String, &Value)> = documents
            .iter()
            .filter(|((c, _), doc)| c == collection && doc.get(field) == Some(value))
            .map(|((_, id), doc)| (id, doc))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0));
        Ok(matches.into_iter().map(|(_, doc)| doc.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_put_merges_without_clobbering() {
        let store = MemoryDocumentStore::new();
        store
            .put(TENDERS, "t1", json!({"status": "uploaded", "filename": "itt.pdf"}))
            .await
            .unwrap();
        store
            .put(TENDERS, "t1", json!({"status": "analyzed", "analyzedData": {"score": 60}}))
            .await
            .unwrap();

        let doc = store.get(TENDERS, "t1").await.unwrap().unwrap();
        assert_eq!(
            doc,
            json!({"status": "analyzed", "filename": "itt.pdf", "analyzedData": {"score": 60}})
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = MemoryDocumentStore::new();
        assert!(store.get(BIDS, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_is_equality_within_collection() {
        let store = MemoryDocumentStore::new();
        store.put(BIDS, "b2", json!({"tenderId": "t1", "n": 2})).await.unwrap();
        store.put(BIDS, "b1", json!({"tenderId": "t1", "n": 1})).await.unwrap();
        store.put(BIDS, "b3", json!({"tenderId": "t2", "n": 3})).await.unwrap();
        store.put(TENDERS, "t1", json!({"tenderId": "t1"})).await.unwrap();

        let found = store.query(BIDS, "tenderId", &json!("t1")).await.unwrap();
        assert_eq!(found, vec![json!({"tenderId": "t1", "n": 1}), json!({"tenderId": "t1", "n": 2})]);
    }

    #[tokio::test]
    async fn test_non_object_documents_are_rejected() {
        let store = MemoryDocumentStore::new();
        let err = store.put(BIDS, "b1", json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidDocument(_)));
    }

    #[test]
    fn test_merge_replaces_nested_values_wholesale() {
        let mut existing = json!({"a": {"x": 1, "y": 2}, "b": true});
        merge_documents(&mut existing, json!({"a": {"x": 9}}));
        assert_eq!(existing, json!({"a": {"x": 9}, "b": true}));
    }
}
