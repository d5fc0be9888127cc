pub mod config;
pub mod database;
pub mod store;
pub mod models;
pub mod seating;
pub mod services;
pub mod cache;
pub mod controllers;
pub mod middleware;
pub mod error;
pub mod timefmt;

use std::sync::Arc;
use tracing::{info, warn};

use config::{Config, StoreBackend};
use store::DocumentStore;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub auth: services::AuthService,
    pub catalog: services::CatalogService,
    pub bookings: services::BookingService,
    pub reviews: services::ReviewService,
}

impl AppState {
    pub fn with_store(
        store: Arc<dyn DocumentStore>,
        cache: Option<cache::CacheService>,
        config: &Config,
    ) -> Arc<Self> {
        Arc::new(Self {
            auth: services::AuthService::new(store.clone(), config.auth.clone()),
            catalog: services::CatalogService::new(store.clone(), cache.clone()),
            bookings: services::BookingService::new(store.clone()),
            reviews: services::ReviewService::new(store, cache),
        })
    }

    pub async fn connect(config: Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn DocumentStore> = match config.store.backend {
            StoreBackend::Postgres => {
                let db = database::Database::connect(&config.database).await?;
                info!("Database connected");
                db.run_migrations().await?;
                Arc::new(store::PgDocumentStore::new(&db))
            }
            StoreBackend::Memory => {
                warn!("Using in-memory document store, data is not persisted");
                Arc::new(store::MemoryStore::new())
            }
        };

        // Кеш необязателен: без Redis всё читается из хранилища
        let cache = match config.redis.url.as_deref() {
            Some(url) => match cache::CacheService::connect(url, config.cache.clone()).await {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!("Redis unavailable, catalog cache disabled: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Self::with_store(store, cache, &config))
    }
}
