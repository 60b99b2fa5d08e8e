use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::storage::{ensure_object, DocumentStore, StorageError};

/// `documents(collection, id, data jsonb)` backed store. The upsert merges
/// with `||`, which is a top-level shallow merge, same as the in-memory store.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StorageError> {
        ensure_object(&document)?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = documents.data || EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&document)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StorageError> {
        Ok(sqlx::query_scalar::<_, Value>(
            "SELECT data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StorageError> {
        Ok(sqlx::query_scalar::<_, Value>(
            "SELECT data FROM documents WHERE collection = $1 AND data -> $2 = $3 ORDER BY id",
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await?)
    }
}
