use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool, Row};
use tracing::debug;

use super::{Collection, Document, DocumentStore, Filter, StoreError, StoreResult};
use crate::database::Database;

/// Документы хранятся одной таблицей `documents (collection, id, data JSONB)`.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool.clone() }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let row = sqlx::query("SELECT data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(data): Json<Value> = row.try_get("data")?;
                Ok(Some(Document { id: id.to_string(), data }))
            }
            None => Ok(None),
        }
    }

    async fn query(&self, collection: Collection, filters: &[Filter]) -> StoreResult<Vec<Document>> {
        // Собираем WHERE динамически: по паре параметров (поле, значение) на фильтр
        let mut q = String::from("SELECT id, data FROM documents WHERE collection = $1");
        let mut bind_idx = 2;
        for _ in filters {
            q.push_str(&format!(
                " AND data @> jsonb_build_object(${}::text, ${}::jsonb)",
                bind_idx,
                bind_idx + 1
            ));
            bind_idx += 2;
        }
        q.push_str(" ORDER BY id");

        let mut dbq = sqlx::query(&q).bind(collection.as_str());
        for f in filters {
            dbq = dbq.bind(f.field).bind(Json(f.value.clone()));
        }

        let rows = dbq.fetch_all(&self.pool).await?;
        debug!("query {} with {} filters -> {} documents", collection, filters.len(), rows.len());

        rows.into_iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let Json(data): Json<Value> = row.try_get("data")?;
                Ok(Document { id, data })
            })
            .collect()
    }

    async fn create(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
        server_timestamp: Option<&'static str>,
    ) -> StoreResult<Document> {
        // Метку времени ставит сам Postgres, а не клиент
        let row = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES (
                $1,
                $2,
                CASE WHEN $4::text IS NULL THEN $3::jsonb
                     ELSE jsonb_set(
                         $3::jsonb,
                         ARRAY[$4::text],
                         to_jsonb(to_char(now() AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS.US"Z"'))
                     )
                END
            )
            ON CONFLICT (collection, id) DO NOTHING
            RETURNING data
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(data))
        .bind(server_timestamp)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| StoreError::AlreadyExists { collection, id: id.to_string() })?;
        let Json(data): Json<Value> = row.try_get("data")?;
        Ok(Document { id: id.to_string(), data })
    }

    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        field: &'static str,
        by: i64,
    ) -> StoreResult<i64> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE documents
            SET data = jsonb_set(
                data,
                ARRAY[$3::text],
                to_jsonb(COALESCE((data ->> $3::text)::bigint, 0) + $4)
            ),
            updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING (data ->> $3::text)::bigint
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(field)
        .bind(by)
        .fetch_optional(&self.pool)
        .await?;

        value.ok_or_else(|| StoreError::NotFound { collection, id: id.to_string() })
    }
}
