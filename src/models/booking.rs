use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STATUS_PAID: &str = "paid";

/// Запись о бронировании. Создаётся один раз при оформлении и больше не меняется.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub movie_id: String,
    pub schedule_id: String,
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub seat_ids: Vec<String>,
    #[serde(default)]
    pub total_price: i64,
    /// Проставляется хранилищем при записи
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub status: String,
}

impl Booking {
    pub fn is_paid(&self) -> bool {
        self.status == STATUS_PAID
    }
}
