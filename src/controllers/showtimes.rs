use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Schedule, SeatStatus};
use crate::seating::SeatRow;
use crate::services::booking::Quote;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/showtimes/{id}/seats", get(get_seat_map))
        .route("/showtimes/{id}/quote", post(quote_seats))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatMapResponse {
    schedule: Option<Schedule>,
    room_name: Option<String>,
    /// false - схему показать нельзя (нет сеанса или зала), это не "всё продано"
    displayable: bool,
    available: usize,
    booked: usize,
    rows: Vec<SeatRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRequest {
    seat_ids: Vec<String>,
}

// GET /api/showtimes/{id}/seats
async fn get_seat_map(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SeatMapResponse>, AppError> {
    let map = state.bookings.load_seat_map(&id).await?;
    Ok(Json(SeatMapResponse {
        displayable: map.is_displayable(),
        available: map.matrix.count_with_status(SeatStatus::Available),
        booked: map.matrix.count_with_status(SeatStatus::Booked),
        room_name: map.room.map(|r| r.name),
        schedule: map.schedule,
        rows: map.matrix.rows,
    }))
}

// POST /api/showtimes/{id}/quote
async fn quote_seats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<Quote>, AppError> {
    Ok(Json(state.bookings.quote(&id, &req.seat_ids).await?))
}
