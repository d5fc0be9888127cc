use std::sync::Arc;

use tracing::debug;

use crate::models::{Schedule, Seat, SeatStatus};
use crate::services::booking::BookingDraft;

use super::{SeatMap, SeatMatrix};

/// Цена выбранных мест: сумма base x множитель, с отбрасыванием дробной части.
/// Считаем в десятых, чтобы отбрасывание было точным. Цена из документа
/// не проверяется, поэтому арифметика насыщающая.
pub fn total_price(seats: &[Seat], base_price: i64) -> i64 {
    let tenths = seats.iter().fold(0i64, |acc, s| {
        acc.saturating_add(base_price.saturating_mul(s.seat_type.multiplier_tenths()))
    });
    tenths / 10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// Место занято, недоступно или не найдено - ничего не поменялось
    Ignored,
}

/// Локальный выбор мест поверх снимка матрицы.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    matrix: Arc<SeatMatrix>,
    base_price: i64,
    selected: Vec<Seat>,
    total_price: i64,
}

impl SelectionTracker {
    pub fn new(matrix: SeatMatrix, base_price: i64) -> Self {
        let mut tracker = Self {
            matrix: Arc::new(matrix),
            base_price,
            selected: Vec::new(),
            total_price: 0,
        };
        tracker.recompute_selection();
        tracker.recompute_price();
        tracker
    }

    /// Текущий снимок. Снимок никогда не меняется после выдачи.
    pub fn matrix(&self) -> Arc<SeatMatrix> {
        Arc::clone(&self.matrix)
    }

    pub fn selected(&self) -> &[Seat] {
        &self.selected
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().map(|s| s.id.clone()).collect()
    }

    pub fn total_price(&self) -> i64 {
        self.total_price
    }

    pub fn toggle(&mut self, seat_id: &str) -> ToggleOutcome {
        let (next, outcome) = match self.matrix.find(seat_id).map(|s| s.status) {
            Some(SeatStatus::Available) => (SeatStatus::Selected, ToggleOutcome::Selected),
            Some(SeatStatus::Selected) => (SeatStatus::Available, ToggleOutcome::Deselected),
            other => {
                debug!("toggle of seat {} ignored (status {:?})", seat_id, other);
                return ToggleOutcome::Ignored;
            }
        };

        self.matrix = Arc::new(self.matrix.with_status(seat_id, next));
        self.recompute_selection();
        self.recompute_price();
        outcome
    }

    pub fn recompute_selection(&mut self) {
        self.selected = self
            .matrix
            .seats()
            .filter(|s| s.status == SeatStatus::Selected)
            .cloned()
            .collect();
    }

    pub fn recompute_price(&mut self) {
        self.total_price = total_price(&self.selected, self.base_price);
    }
}

/// Билет загрузки. Применяется только последний выданный.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Загрузка применена; выбор сброшен, здесь то, что было выбрано до неё
    Applied { discarded_selection: Vec<String> },
    /// Уже выдан более новый билет (или загрузка отменена) - результат отброшен
    Stale,
}

/// Состояние экрана выбора мест для одного сеанса.
///
/// Каждая загрузка авторитетна: она заменяет матрицу целиком и сбрасывает
/// выбор. Результат устаревшей загрузки не применяется.
#[derive(Debug, Default)]
pub struct SeatSelectionSession {
    generation: u64,
    pending: Option<u64>,
    schedule: Option<Schedule>,
    tracker: Option<SelectionTracker>,
}

impl SeatSelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.pending = Some(self.generation);
        LoadTicket(self.generation)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Отмена (экран закрыт): билет больше не применится.
    pub fn cancel_load(&mut self, ticket: LoadTicket) {
        if self.pending == Some(ticket.0) {
            self.pending = None;
        }
    }

    pub fn apply_load(&mut self, ticket: LoadTicket, map: SeatMap) -> LoadOutcome {
        if self.pending != Some(ticket.0) {
            debug!("dropping stale seat load #{} (current #{})", ticket.0, self.generation);
            return LoadOutcome::Stale;
        }
        self.pending = None;

        let discarded_selection = self
            .tracker
            .as_ref()
            .map(SelectionTracker::selected_ids)
            .unwrap_or_default();

        let base_price = map.schedule.as_ref().map(|s| s.price).unwrap_or(0);
        self.tracker = Some(SelectionTracker::new(map.matrix, base_price));
        self.schedule = map.schedule;

        LoadOutcome::Applied { discarded_selection }
    }

    pub fn toggle(&mut self, seat_id: &str) -> ToggleOutcome {
        match self.tracker.as_mut() {
            Some(tracker) => tracker.toggle(seat_id),
            None => ToggleOutcome::Ignored,
        }
    }

    pub fn matrix(&self) -> Arc<SeatMatrix> {
        self.tracker
            .as_ref()
            .map(SelectionTracker::matrix)
            .unwrap_or_default()
    }

    pub fn selected(&self) -> &[Seat] {
        self.tracker.as_ref().map(SelectionTracker::selected).unwrap_or(&[])
    }

    pub fn total_price(&self) -> i64 {
        self.tracker.as_ref().map(SelectionTracker::total_price).unwrap_or(0)
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    /// Данные для оформления брони из текущего выбора.
    pub fn draft(&self) -> BookingDraft {
        BookingDraft {
            schedule: self.schedule.clone(),
            seats: self.selected().to_vec(),
            total_price: self.total_price(),
        }
    }
}
