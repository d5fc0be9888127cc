//! booking.rs
//!
//! Оформление брони и всё, что ему предшествует:
//! 1.  **Загрузка схемы зала**: сеанс -> зал -> объявления рядов -> матрица,
//!     поверх которой накладываются места из оплаченных броней.
//! 2.  **Проверка конфликтов**: непосредственно перед записью занятость
//!     перечитывается заново, пересечение с выбором отклоняет бронь.
//! 3.  **Запись брони** со статусом "paid" и серверной меткой времени.
//!
//! Проверка и запись - два независимых обращения к хранилищу, транзакции
//! нет. Два клиента могут пройти проверку одновременно и оба записать бронь.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{booking::STATUS_PAID, Booking, Room, Schedule, Seat};
use crate::seating::{
    decode_layout, merge_occupancy, total_price, OccupancySet, SeatMap, SeatSelectionSession,
    ToggleOutcome,
};
use crate::services::auth::AuthUser;
use crate::store::{self, Collection, DocumentStore, Filter, StoreError};

/// То, что уходит на оформление: сеанс, выбранные места и цена.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub schedule: Option<Schedule>,
    pub seats: Vec<Seat>,
    pub total_price: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("missing booking information")]
    MissingBookingInfo,

    #[error("must sign in")]
    MustSignIn,

    #[error("no seats selected")]
    NoSeatsSelected,

    #[error("unknown seats: {}", .seats.join(", "))]
    UnknownSeats { seats: Vec<String> },

    #[error("seats already booked: {}", .seats.join(", "))]
    Conflict { seats: Vec<String> },

    #[error("booking already saved")]
    AlreadySaved,

    #[error("booking submission already in progress")]
    InProgress,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Idle -> Submitting -> Saved | Rejected. Rejected можно отправить заново,
/// Saved - конечное состояние.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Saved(Booking),
    Rejected { reason: String, conflicting: Vec<String> },
}

#[derive(Debug, Default)]
pub struct BookingSubmission {
    state: SubmissionState,
}

impl BookingSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    fn begin(&mut self) -> Result<SubmittingGuard<'_>, BookingError> {
        match self.state {
            SubmissionState::Idle | SubmissionState::Rejected { .. } => {
                self.state = SubmissionState::Submitting;
                Ok(SubmittingGuard { submission: self, finished: false })
            }
            SubmissionState::Submitting => Err(BookingError::InProgress),
            SubmissionState::Saved(_) => Err(BookingError::AlreadySaved),
        }
    }
}

/// Если future оформления отменили на полпути, состояние возвращается в Idle.
struct SubmittingGuard<'a> {
    submission: &'a mut BookingSubmission,
    finished: bool,
}

impl SubmittingGuard<'_> {
    fn finish(mut self, result: &Result<Booking, BookingError>) {
        self.submission.state = match result {
            Ok(booking) => SubmissionState::Saved(booking.clone()),
            Err(BookingError::Conflict { seats }) => SubmissionState::Rejected {
                reason: result_reason(result),
                conflicting: seats.clone(),
            },
            Err(_) => SubmissionState::Rejected { reason: result_reason(result), conflicting: Vec::new() },
        };
        self.finished = true;
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.submission.state = SubmissionState::Idle;
        }
    }
}

fn result_reason(result: &Result<Booking, BookingError>) -> String {
    match result {
        Ok(_) => String::new(),
        Err(e) => e.to_string(),
    }
}

/// Предварительный расчёт выбора.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub schedule_id: String,
    pub seats: Vec<Seat>,
    pub total_price: i64,
}

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn DocumentStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Схема зала для сеанса с актуальной занятостью.
    /// Нет сеанса или зала - пустая матрица, а не ошибка.
    pub async fn load_seat_map(&self, schedule_id: &str) -> Result<SeatMap, StoreError> {
        let docs = self.store.as_ref();

        let Some(schedule) = store::fetch::<Schedule>(docs, Collection::Schedules, schedule_id).await? else {
            warn!("Schedule {} not found, seat map unavailable", schedule_id);
            return Ok(SeatMap::unavailable());
        };

        let Some(room) = store::fetch::<Room>(docs, Collection::Rooms, &schedule.room_id).await? else {
            warn!("Room {} of schedule {} not found, seat map unavailable", schedule.room_id, schedule_id);
            return Ok(SeatMap { schedule: Some(schedule), room: None, matrix: Default::default() });
        };

        let occupied = self.occupancy(schedule_id).await?;
        let matrix = merge_occupancy(&decode_layout(&room.seat_matrix), &occupied);
        debug!(
            "Seat map for schedule {}: {} seats, {} occupied ids",
            schedule_id,
            matrix.seat_count(),
            occupied.len()
        );

        Ok(SeatMap { schedule: Some(schedule), room: Some(room), matrix })
    }

    /// Места из всех оплаченных броней сеанса, всегда свежим запросом.
    pub async fn occupancy(&self, schedule_id: &str) -> Result<OccupancySet, StoreError> {
        let bookings: Vec<Booking> = store::fetch_all(
            self.store.as_ref(),
            Collection::Bookings,
            &[Filter::eq("scheduleId", schedule_id), Filter::eq("status", STATUS_PAID)],
        )
        .await?;
        Ok(OccupancySet::from_bookings(&bookings))
    }

    /// Загружает схему в сессию и выбирает запрошенные места.
    async fn select(
        &self,
        schedule_id: &str,
        seat_ids: &[String],
    ) -> Result<SeatSelectionSession, BookingError> {
        let mut session = SeatSelectionSession::new();
        let ticket = session.begin_load();
        let map = self.load_seat_map(schedule_id).await?;
        if !map.is_displayable() {
            return Err(BookingError::MissingBookingInfo);
        }
        session.apply_load(ticket, map);

        let mut booked = Vec::new();
        let mut unknown = Vec::new();
        for id in seat_ids {
            let already_selected = session.selected().iter().any(|s| &s.id == id);
            if already_selected {
                continue;
            }
            if session.toggle(id) == ToggleOutcome::Ignored {
                match session.matrix().find(id) {
                    Some(_) => booked.push(id.clone()),
                    None => unknown.push(id.clone()),
                }
            }
        }

        if !unknown.is_empty() {
            return Err(BookingError::UnknownSeats { seats: unknown });
        }
        if !booked.is_empty() {
            return Err(BookingError::Conflict { seats: booked });
        }
        Ok(session)
    }

    pub async fn quote(&self, schedule_id: &str, seat_ids: &[String]) -> Result<Quote, BookingError> {
        let session = self.select(schedule_id, seat_ids).await?;
        Ok(Quote {
            schedule_id: schedule_id.to_string(),
            seats: session.selected().to_vec(),
            total_price: session.total_price(),
        })
    }

    /// Выбор по списку id и оформление за один вызов (HTTP).
    pub async fn book_seats(
        &self,
        user: Option<&AuthUser>,
        schedule_id: &str,
        seat_ids: &[String],
    ) -> Result<Booking, BookingError> {
        if user.is_none() {
            return Err(BookingError::MustSignIn);
        }
        let session = self.select(schedule_id, seat_ids).await?;
        let mut submission = BookingSubmission::new();
        self.submit(&mut submission, user, &session.draft()).await
    }

    pub async fn submit(
        &self,
        submission: &mut BookingSubmission,
        user: Option<&AuthUser>,
        draft: &BookingDraft,
    ) -> Result<Booking, BookingError> {
        let guard = submission.begin()?;
        let result = self.try_submit(user, draft).await;
        guard.finish(&result);
        result
    }

    async fn try_submit(
        &self,
        user: Option<&AuthUser>,
        draft: &BookingDraft,
    ) -> Result<Booking, BookingError> {
        let schedule = match &draft.schedule {
            Some(s) if !s.id.is_empty() && !s.movie_id.is_empty() => s,
            _ => return Err(BookingError::MissingBookingInfo),
        };
        let user = user.ok_or(BookingError::MustSignIn)?;
        if draft.seats.is_empty() {
            return Err(BookingError::NoSeatsSelected);
        }

        let booking_id = new_booking_id();

        // Проверка конфликтов: занятость перечитывается прямо перед записью
        let occupied = self.occupancy(&schedule.id).await?;
        let conflicts = occupied.conflicts(&draft.seats);
        if !conflicts.is_empty() {
            warn!(
                "Booking {} rejected for user {}: seats {:?} already booked",
                booking_id, user.uid, conflicts
            );
            return Err(BookingError::Conflict { seats: conflicts });
        }

        let price = total_price(&draft.seats, schedule.price);
        if price != draft.total_price {
            debug!("Draft price {} differs from computed {}, using computed", draft.total_price, price);
        }

        let booking = Booking {
            id: booking_id.clone(),
            user_id: user.uid.clone(),
            movie_id: schedule.movie_id.clone(),
            schedule_id: schedule.id.clone(),
            room_id: schedule.room_id.clone(),
            seat_ids: draft.seats.iter().map(|s| s.id.clone()).collect(),
            total_price: price,
            created_at: None,
            status: STATUS_PAID.to_string(),
        };

        let data = serde_json::to_value(&booking).map_err(|source| StoreError::Decode {
            collection: Collection::Bookings,
            id: booking_id.clone(),
            source,
        })?;
        let doc = self
            .store
            .create(Collection::Bookings, &booking_id, data, Some("createdAt"))
            .await?;
        let saved: Booking = store::decode(Collection::Bookings, doc)?;

        info!(
            "Booking {} saved: user {}, schedule {}, seats {:?}, total {}",
            saved.id, saved.user_id, saved.schedule_id, saved.seat_ids, saved.total_price
        );
        Ok(saved)
    }

    /// Брони пользователя, новые первыми.
    pub async fn user_bookings(&self, user_id: &str) -> Result<Vec<Booking>, StoreError> {
        let mut bookings: Vec<Booking> = store::fetch_all(
            self.store.as_ref(),
            Collection::Bookings,
            &[Filter::eq("userId", user_id)],
        )
        .await?;
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }
}

fn new_booking_id() -> String {
    format!("BK{}", Uuid::new_v4().simple()).to_uppercase()
}
