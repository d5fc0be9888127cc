use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(default)]
    pub id: String,
    pub theater_id: String,
    pub name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub screen_type: String,
    #[serde(default)]
    pub available_seats: u32,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub seat_matrix: Vec<SeatRowDeclaration>,
}

/// Объявление ряда в документе зала: метка ряда и типы мест по порядку.
/// Два соседних "double" означают одно двойное место.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRowDeclaration {
    pub row: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl SeatRowDeclaration {
    pub fn new<I, S>(row: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            row: row.into(),
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}
