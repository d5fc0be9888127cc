use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::timefmt::{self, TimeParseError};

/// Сеанс: фильм в конкретном зале в конкретное время.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub id: String,
    pub movie_id: String,
    pub room_id: String,
    /// Сырые строки из документа, форматы разные
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    /// Базовая цена места, целое число (валюта без дробной части)
    pub price: i64,
    #[serde(default)]
    pub available_seats: u32,
    #[serde(default)]
    pub language: String,
}

impl Schedule {
    pub fn starts_at(&self) -> Result<NaiveDateTime, TimeParseError> {
        timefmt::parse_timestamp(&self.start_time)
    }

    pub fn ends_at(&self) -> Result<Option<NaiveDateTime>, TimeParseError> {
        if self.end_time.trim().is_empty() {
            return Ok(None);
        }
        timefmt::parse_timestamp(&self.end_time).map(Some)
    }

    pub fn date(&self) -> Result<NaiveDate, TimeParseError> {
        self.starts_at().map(|dt| dt.date())
    }
}
