use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Standard,
    Vip,
    Double,
}

impl SeatType {
    /// Тег из объявления ряда. Неизвестные теги - обычное место.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "vip" => SeatType::Vip,
            "double" => SeatType::Double,
            _ => SeatType::Standard,
        }
    }

    /// Множитель цены в десятых: 1.0 / 1.3 / 2.0
    pub fn multiplier_tenths(&self) -> i64 {
        match self {
            SeatType::Standard => 10,
            SeatType::Vip => 13,
            SeatType::Double => 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Booked,
    Selected,
    Unavailable,
}

/// Конкретное место в матрице зала для сеанса.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Ряд + номер: "A1", для двойного места "A3-4"
    pub id: String,
    pub row: String,
    pub number: String,
    #[serde(rename = "type")]
    pub seat_type: SeatType,
    pub status: SeatStatus,
}

impl Seat {
    pub fn new(row: &str, number: String, seat_type: SeatType) -> Self {
        Self {
            id: format!("{}{}", row, number),
            row: row.to_string(),
            number,
            seat_type,
            status: SeatStatus::Available,
        }
    }

    /// Первое число номера; для "3-4" это 3.
    pub fn first_number(&self) -> u32 {
        self.number
            .split('-')
            .next()
            .and_then(|n| n.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Идентификаторы половинок двойного места: "A5-6" -> ["A5", "A6"].
    pub fn sub_ids(&self) -> Vec<String> {
        if self.seat_type != SeatType::Double {
            return Vec::new();
        }
        self.number
            .split('-')
            .map(|n| format!("{}{}", self.row, n.trim()))
            .collect()
    }

    pub fn is_selectable(&self) -> bool {
        matches!(self.status, SeatStatus::Available | SeatStatus::Selected)
    }
}
