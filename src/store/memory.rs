use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{Collection, Document, DocumentStore, Filter, StoreError, StoreResult};

/// Хранилище в памяти процесса.
///
/// Используется в тестах и для бэкенда `memory` при локальном запуске.
/// Умеет считать записи и имитировать отказ на запись.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<(Collection, String), Value>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Кладёт документ без проверок и без учёта в счётчике записей.
    pub async fn seed(&self, collection: Collection, id: impl Into<String>, data: Value) {
        self.docs.write().await.insert((collection, id.into()), data);
    }

    /// Количество успешных `create`/`increment`.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn count(&self, collection: Collection) -> usize {
        self.docs.read().await.keys().filter(|(c, _)| *c == collection).count()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected by backend".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let docs = self.docs.read().await;
        Ok(docs
            .get(&(collection, id.to_string()))
            .map(|data| Document { id: id.to_string(), data: data.clone() }))
    }

    async fn query(&self, collection: Collection, filters: &[Filter]) -> StoreResult<Vec<Document>> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .filter(|((c, _), data)| *c == collection && filters.iter().all(|f| f.matches(data)))
            .map(|((_, id), data)| Document { id: id.clone(), data: data.clone() })
            .collect())
    }

    async fn create(
        &self,
        collection: Collection,
        id: &str,
        mut data: Value,
        server_timestamp: Option<&'static str>,
    ) -> StoreResult<Document> {
        self.check_writable()?;
        let key = (collection, id.to_string());
        let mut docs = self.docs.write().await;
        if docs.contains_key(&key) {
            return Err(StoreError::AlreadyExists { collection, id: id.to_string() });
        }
        if let (Some(field), Value::Object(map)) = (server_timestamp, &mut data) {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
            map.insert(field.to_string(), Value::String(now));
        }
        docs.insert(key, data.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Document { id: id.to_string(), data })
    }

    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        field: &'static str,
        by: i64,
    ) -> StoreResult<i64> {
        self.check_writable()?;
        let mut docs = self.docs.write().await;
        let data = docs
            .get_mut(&(collection, id.to_string()))
            .ok_or_else(|| StoreError::NotFound { collection, id: id.to_string() })?;
        let current = data.get(field).and_then(Value::as_i64).unwrap_or(0);
        let next = current + by;
        if let Value::Object(map) = data {
            map.insert(field.to_string(), Value::from(next));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(next)
    }
}
