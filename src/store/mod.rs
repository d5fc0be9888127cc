//! Абстракция над документной базой.
//!
//! Всё приложение работает с хранилищем только через [`DocumentStore`]:
//! коллекции документов, чтение по id, выборка по равенству полей,
//! создание с серверной меткой времени и атомарный инкремент счётчика.
//! Хендл хранилища создаётся один раз в `main` и передаётся явно.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Коллекции документной базы.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Movies,
    Theaters,
    Rooms,
    Schedules,
    Bookings,
    Reviews,
    Users,
    Accounts,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Movies => "movies",
            Collection::Theaters => "theaters",
            Collection::Rooms => "rooms",
            Collection::Schedules => "schedules",
            Collection::Bookings => "bookings",
            Collection::Reviews => "reviews",
            Collection::Users => "users",
            Collection::Accounts => "accounts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Сырой документ: id + JSON-тело.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Фильтр выборки. Поддерживается только равенство поля верхнего уровня.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: &'static str,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self { field, value: value.into() }
    }

    pub fn matches(&self, data: &Value) -> bool {
        data.get(self.field) == Some(&self.value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: Collection, id: String },

    #[error("document {collection}/{id} already exists")]
    AlreadyExists { collection: Collection, id: String },

    #[error("document {collection}/{id} is malformed: {source}")]
    Decode {
        collection: Collection,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// Все документы коллекции, удовлетворяющие всем фильтрам, в порядке id.
    async fn query(&self, collection: Collection, filters: &[Filter]) -> StoreResult<Vec<Document>>;

    /// Создаёт документ. Если задан `server_timestamp`, хранилище записывает
    /// в это поле своё текущее время (RFC 3339, UTC).
    /// Существующий id -> [`StoreError::AlreadyExists`].
    async fn create(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
        server_timestamp: Option<&'static str>,
    ) -> StoreResult<Document>;

    /// Атомарно прибавляет `by` к числовому полю и возвращает новое значение.
    async fn increment(
        &self,
        collection: Collection,
        id: &str,
        field: &'static str,
        by: i64,
    ) -> StoreResult<i64>;
}

/// Декодирует документ в модель. Поле `id` берётся из документа,
/// если в теле его нет.
pub fn decode<T: DeserializeOwned>(collection: Collection, doc: Document) -> StoreResult<T> {
    let Document { id, mut data } = doc;
    if let Value::Object(map) = &mut data {
        map.entry("id").or_insert_with(|| Value::String(id.clone()));
    }
    serde_json::from_value(data).map_err(|source| StoreError::Decode { collection, id, source })
}

pub async fn fetch<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> StoreResult<Option<T>> {
    match store.get(collection, id).await? {
        Some(doc) => decode(collection, doc).map(Some),
        None => Ok(None),
    }
}

pub async fn fetch_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    filters: &[Filter],
) -> StoreResult<Vec<T>> {
    store
        .query(collection, filters)
        .await?
        .into_iter()
        .map(|doc| decode(collection, doc))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Named {
        id: String,
        name: String,
    }

    #[test]
    fn decode_injects_document_id() {
        let doc = Document { id: "t1".into(), data: json!({ "name": "Galaxy" }) };
        let named: Named = decode(Collection::Theaters, doc).unwrap();
        assert_eq!(named.id, "t1");
        assert_eq!(named.name, "Galaxy");
    }

    #[test]
    fn decode_keeps_explicit_id() {
        let doc = Document { id: "doc".into(), data: json!({ "id": "inner", "name": "x" }) };
        let named: Named = decode(Collection::Theaters, doc).unwrap();
        assert_eq!(named.id, "inner");
    }

    #[test]
    fn decode_reports_collection_on_error() {
        let doc = Document { id: "r9".into(), data: json!({ "name": 5 }) };
        let err = decode::<Named>(Collection::Rooms, doc).unwrap_err();
        assert!(matches!(err, StoreError::Decode { collection: Collection::Rooms, .. }));
        assert!(err.to_string().contains("rooms/r9"));
    }

    #[test]
    fn filter_matches_top_level_field() {
        let f = Filter::eq("status", "paid");
        assert!(f.matches(&json!({ "status": "paid" })));
        assert!(!f.matches(&json!({ "status": "refunded" })));
        assert!(!f.matches(&json!({})));
    }
}
