//! Схема зала: разбор объявлений рядов, наложение занятости, выбор мест.
//!
//! Матрица мест всегда неизменяема: любое изменение статуса строит новую
//! матрицу, а наружу отдаётся `Arc`-снимок.

use serde::Serialize;

use crate::models::{Room, Schedule, Seat, SeatStatus};

pub mod layout;
pub mod occupancy;
pub mod selection;

pub use layout::{decode_layout, decode_row};
pub use occupancy::{merge_occupancy, OccupancySet};
pub use selection::{
    total_price, LoadOutcome, LoadTicket, SeatSelectionSession, SelectionTracker, ToggleOutcome,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatRow {
    pub label: String,
    pub seats: Vec<Seat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeatMatrix {
    pub rows: Vec<SeatRow>,
}

impl SeatMatrix {
    pub fn new(rows: Vec<SeatRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.rows.iter().flat_map(|r| r.seats.iter())
    }

    pub fn seat_count(&self) -> usize {
        self.rows.iter().map(|r| r.seats.len()).sum()
    }

    pub fn find(&self, seat_id: &str) -> Option<&Seat> {
        self.seats().find(|s| s.id == seat_id)
    }

    pub fn count_with_status(&self, status: SeatStatus) -> usize {
        self.seats().filter(|s| s.status == status).count()
    }

    /// Новая матрица, где у одного места другой статус.
    pub fn with_status(&self, seat_id: &str, status: SeatStatus) -> SeatMatrix {
        let rows = self
            .rows
            .iter()
            .map(|row| SeatRow {
                label: row.label.clone(),
                seats: row
                    .seats
                    .iter()
                    .map(|seat| {
                        if seat.id == seat_id {
                            Seat { status, ..seat.clone() }
                        } else {
                            seat.clone()
                        }
                    })
                    .collect(),
            })
            .collect();
        SeatMatrix { rows }
    }
}

/// Результат загрузки схемы для сеанса.
///
/// Пустая матрица значит "схему показать нельзя" (нет сеанса или зала),
/// а не "все места проданы".
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeatMap {
    pub schedule: Option<Schedule>,
    pub room: Option<Room>,
    pub matrix: SeatMatrix,
}

impl SeatMap {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_displayable(&self) -> bool {
        !self.matrix.is_empty()
    }
}
