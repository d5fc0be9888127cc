#![allow(dead_code)]

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::json;
use std::sync::Arc;

use cinema_booking::config::{Config, StoreBackend};
use cinema_booking::services::AuthUser;
use cinema_booking::store::{Collection, MemoryStore};
use cinema_booking::AppState;

pub const SCHEDULE: &str = "s1";
pub const BASE_PRICE: i64 = 100_000;

pub fn test_config() -> Config {
    let mut config = Config::from_defaults().expect("default config");
    config.store.backend = StoreBackend::Memory;
    config.auth.bcrypt_cost = 4;
    config.auth.jwt_secret = "integration-secret".to_string();
    config
}

pub fn viewer() -> AuthUser {
    AuthUser {
        uid: uuid::Uuid::new_v4().to_string(),
        email: SafeEmail().fake(),
    }
}

pub fn random_name() -> String {
    Name().fake()
}

/// Один кинотеатр, один зал, один сеанс.
///
/// Ряд A: standard, vip, double, double -> A1, A2, A3-4.
/// Ряд B: четыре обычных места. A1 уже оплачен, бронь на B1 отменена.
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    store
        .seed(Collection::Movies, "m1", json!({
            "title": "Dune: Part Two",
            "director": "Denis Villeneuve",
            "genre": "sci-fi",
            "duration": 166,
            "status": "now showing"
        }))
        .await;
    store
        .seed(Collection::Theaters, "t1", json!({
            "name": "Galaxy Nguyen Du",
            "city": "Ho Chi Minh City",
            "facilities": ["parking"]
        }))
        .await;
    store
        .seed(Collection::Rooms, "r1", json!({
            "theaterId": "t1",
            "name": "Room 1",
            "capacity": 8,
            "screenType": "IMAX",
            "seatMatrix": [
                { "row": "A", "types": ["standard", "vip", "double", "double"] },
                { "row": "B", "types": ["standard", "standard", "standard", "standard"] }
            ]
        }))
        .await;
    store
        .seed(Collection::Schedules, SCHEDULE, json!({
            "movieId": "m1",
            "roomId": "r1",
            "startTime": "2025-03-14 19:30",
            "endTime": "2025-03-14 22:16",
            "price": BASE_PRICE,
            "availableSeats": 7,
            "language": "en"
        }))
        .await;
    store
        .seed(Collection::Bookings, "BK-EXISTING", json!({
            "userId": "someone-else",
            "movieId": "m1",
            "scheduleId": SCHEDULE,
            "roomId": "r1",
            "seatIds": ["A1"],
            "totalPrice": BASE_PRICE,
            "status": "paid"
        }))
        .await;
    store
        .seed(Collection::Bookings, "BK-CANCELLED", json!({
            "userId": "someone-else",
            "movieId": "m1",
            "scheduleId": SCHEDULE,
            "roomId": "r1",
            "seatIds": ["B1"],
            "totalPrice": BASE_PRICE,
            "status": "cancelled"
        }))
        .await;

    store
}

pub fn app_state(store: Arc<MemoryStore>) -> Arc<AppState> {
    AppState::with_store(store, None, &test_config())
}
