use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::Booking;
use crate::services::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/bookings", get(get_user_bookings).post(create_booking))
}

/* ---------- BOOKINGS ---------- */

// POST /api/bookings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookingRequest {
    schedule_id: String,
    seat_ids: Vec<String>,
}

// Без авторизации сервис сам вернёт MustSignIn
async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: Option<AuthUser>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    if req.schedule_id.trim().is_empty() {
        return Err(AppError::BadRequest("scheduleId is required".to_string()));
    }

    let booking = state
        .bookings
        .book_seats(user.as_ref(), &req.schedule_id, &req.seat_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings
async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.user_bookings(&user.uid).await?))
}
