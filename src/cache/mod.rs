use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;

pub mod catalog;

/// Кеш каталога в Redis. Любая ошибка Redis - это промах кеша,
/// запрос идёт в хранилище.
#[derive(Clone)]
pub struct CacheService {
    conn: MultiplexedConnection,
    ttl: CacheConfig,
}

impl CacheService {
    pub async fn connect(redis_url: &str, ttl: CacheConfig) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        info!("Connected to Redis cache");
        Ok(Self { conn, ttl })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<Option<String>> = conn.get(key).await;
        let data = match result {
            Ok(data) => data,
            Err(e) => {
                warn!("Cache read {} failed: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&data?) {
            Ok(value) => {
                debug!("Cache hit {}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Cache entry {} is corrupt: {}", key, e);
                None
            }
        }
    }

    pub(crate) async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                warn!("Cache serialize {} failed: {}", key, e);
                return;
            }
        };
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = conn.set_ex(key, data, ttl_seconds).await;
        if let Err(e) = result {
            warn!("Cache write {} failed: {}", key, e);
        }
    }

    pub(crate) async fn invalidate(&self, key: &str) {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = conn.del(key).await;
        if let Err(e) = result {
            warn!("Cache invalidate {} failed: {}", key, e);
        }
    }
}
