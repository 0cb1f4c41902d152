//! PostgreSQL document store.
//!
//! Each collection is a table with one JSONB column:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS "<collection>" (
//!     id  TEXT PRIMARY KEY,
//!     doc JSONB NOT NULL,
//!     seq BIGSERIAL
//! );
//! ```
//!
//! `_id` lives in the `id` column and is merged back into the document on
//! the way out. Filters are translated entry by entry into JSONB predicates
//! that select exactly what [`stockroom_core::document::matches`] selects.

use crate::error::StoreError;
use crate::{DocumentStore, UpdateResult, new_document_id};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Arguments, PgPool, Row};
use stockroom_core::document::{self, Document, ID_FIELD};

const MAX_CONNECTIONS: u32 = 5;

fn args_add<T>(args: &mut PgArguments, v: T) -> Result<(), StoreError>
where
    T: Send + Sync + 'static,
    for<'q> T: sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    args.add(v)
        .map_err(|e| StoreError::Database(sqlx::Error::Encode(e)))
}

/// Quote a collection name for use as a table identifier.
///
/// Only `[A-Za-z_][A-Za-z0-9_]*` (at most 63 bytes) is accepted.
fn quote_ident(ident: &str) -> Result<String, StoreError> {
    let mut chars = ident.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_start || !valid_rest || ident.len() > 63 {
        return Err(StoreError::Configuration(format!(
            "invalid collection name '{}'",
            ident
        )));
    }
    Ok(format!("\"{}\"", ident))
}

/// A filter rendered as a SQL boolean expression with its bind arguments.
struct FilterSql {
    condition: String,
    args: PgArguments,
}

fn build_filter(filter: &Document) -> Result<FilterSql, StoreError> {
    document::validate_filter(filter)?;

    let mut args = PgArguments::default();
    let mut parts = Vec::with_capacity(filter.len());
    let mut idx = 1;

    for (key, expected) in filter {
        if key == ID_FIELD {
            parts.push(format!("id = ${}", idx));
            args_add(&mut args, document::id_to_string(expected))?;
            idx += 1;
            continue;
        }

        let path: Vec<String> = key.split('.').map(str::to_string).collect();
        let p = idx;
        let v = idx + 1;
        args_add(&mut args, path)?;
        args_add(&mut args, Json(expected.clone()))?;
        idx += 2;

        let part = if expected.is_array() {
            format!("doc #> ${p} = ${v}::jsonb")
        } else {
            let contains = format!(
                "doc #> ${p} = ${v}::jsonb OR (jsonb_typeof(doc #> ${p}) = 'array' \
                 AND EXISTS (SELECT 1 FROM jsonb_array_elements(doc #> ${p}) AS e(item) \
                 WHERE e.item = ${v}::jsonb))"
            );
            if expected.is_null() {
                format!("(doc #> ${p} IS NULL OR {contains})")
            } else {
                format!("({contains})")
            }
        };
        parts.push(part);
    }

    let condition = if parts.is_empty() {
        "TRUE".to_string()
    } else {
        parts.join(" AND ")
    };
    Ok(FilterSql { condition, args })
}

/// Document store backed by a PostgreSQL table.
pub struct PostgresStore {
    pool: PgPool,
    collection: String,
    table: String,
}

impl PostgresStore {
    /// Connect and make sure the collection table exists.
    pub async fn connect(database_uri: &str, collection: &str) -> Result<Self, StoreError> {
        let table = quote_ident(collection)?;
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_uri)
            .await?;

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, doc JSONB NOT NULL, seq BIGSERIAL)",
            table
        );
        sqlx::query(&ddl).execute(&pool).await?;

        Ok(Self {
            pool,
            collection: collection.to_string(),
            table,
        })
    }

    fn row_to_document(row: &PgRow) -> Result<Document, StoreError> {
        let id: String = row.try_get("id")?;
        let doc: Value = row.try_get("doc")?;
        let mut doc: Document = serde_json::from_value(doc)?;
        doc.insert(ID_FIELD.to_string(), Value::String(id));
        Ok(doc)
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn find(&self, filter: &Document) -> Result<Vec<Document>, StoreError> {
        let FilterSql { condition, args } = build_filter(filter)?;
        let sql = format!(
            "SELECT id, doc FROM {} WHERE {} ORDER BY seq",
            self.table, condition
        );
        let rows = sqlx::query_with(&sql, args).fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_document).collect()
    }

    async fn find_one(&self, filter: &Document) -> Result<Option<Document>, StoreError> {
        let FilterSql { condition, args } = build_filter(filter)?;
        let sql = format!(
            "SELECT id, doc FROM {} WHERE {} ORDER BY seq LIMIT 1",
            self.table, condition
        );
        let row = sqlx::query_with(&sql, args)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn insert_one(&self, mut doc: Document) -> Result<String, StoreError> {
        let id = match doc.remove(ID_FIELD) {
            Some(value) => document::id_to_string(&value),
            None => new_document_id(),
        };

        let mut args = PgArguments::default();
        args_add(&mut args, id.clone())?;
        args_add(&mut args, Json(Value::Object(doc)))?;

        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", self.table);
        match sqlx::query_with(&sql, args).execute(&self.pool).await {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(StoreError::DuplicateId(id));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(collection = %self.collection, id = %id, "Inserted document");
        Ok(id)
    }

    async fn delete_one(&self, filter: &Document) -> Result<u64, StoreError> {
        let FilterSql { condition, args } = build_filter(filter)?;
        let sql = format!(
            "DELETE FROM {table} WHERE id = (SELECT id FROM {table} WHERE {condition} ORDER BY seq LIMIT 1)",
            table = self.table,
            condition = condition
        );
        let result = sqlx::query_with(&sql, args).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn update_one(
        &self,
        filter: &Document,
        fields: &Document,
    ) -> Result<UpdateResult, StoreError> {
        document::validate_update(fields)?;
        let FilterSql { condition, args } = build_filter(filter)?;

        let mut tx = self.pool.begin().await?;

        let select = format!(
            "SELECT id, doc FROM {} WHERE {} ORDER BY seq LIMIT 1 FOR UPDATE",
            self.table, condition
        );
        let Some(row) = sqlx::query_with(&select, args)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(UpdateResult::default());
        };

        let id: String = row.try_get("id")?;
        let stored: Value = row.try_get("doc")?;
        let mut doc: Document = serde_json::from_value(stored)?;
        let changed = document::apply_set(&mut doc, fields)?;

        if changed {
            let mut update_args = PgArguments::default();
            args_add(&mut update_args, Json(Value::Object(doc)))?;
            args_add(&mut update_args, id)?;
            let update = format!("UPDATE {} SET doc = $1 WHERE id = $2", self.table);
            sqlx::query_with(&update, update_args)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(changed),
        })
    }

    async fn count_documents(&self, filter: &Document) -> Result<u64, StoreError> {
        let FilterSql { condition, args } = build_filter(filter)?;
        let sql = format!(
            "SELECT COUNT(*) AS cnt FROM {} WHERE {}",
            self.table, condition
        );
        let row = sqlx::query_with(&sql, args).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("cnt")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn close(&self) {
        tracing::info!(collection = %self.collection, "Closing PostgreSQL connection pool");
        self.pool.close().await;
    }
}
