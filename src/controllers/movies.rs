use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Movie, MovieStatus, Schedule, Theater};
use crate::services::catalog::TheaterShowtimes;
use crate::timefmt;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{id}", get(get_movie))
        .route("/movies/{id}/dates", get(movie_dates))
        .route("/movies/{id}/schedules", get(movie_schedules))
        .route("/movies/{id}/theaters", get(movie_theaters))
        .route("/theaters", get(list_theaters))
}

#[derive(Debug, Deserialize)]
struct MoviesQuery {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: String,
}

#[derive(Debug, Deserialize)]
struct DatesQuery {
    from: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    timefmt::parse_date(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

// GET /api/movies?status=coming_soon
async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MoviesQuery>,
) -> Result<Json<Vec<Movie>>, AppError> {
    let status = params
        .status
        .as_deref()
        .map(MovieStatus::parse)
        .unwrap_or_default();
    Ok(Json(state.catalog.movies_by_status(status).await?))
}

// GET /api/movies/{id}
async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Movie>, AppError> {
    state
        .catalog
        .movie(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("movie {} not found", id)))
}

// GET /api/movies/{id}/dates?from=2025-03-14
async fn movie_dates(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DatesQuery>,
) -> Result<Json<Vec<NaiveDate>>, AppError> {
    let from = params.from.as_deref().map(parse_date).transpose()?;
    Ok(Json(state.catalog.available_dates(&id, from).await?))
}

// GET /api/movies/{id}/schedules?date=2025-03-14
async fn movie_schedules(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DateQuery>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let date = parse_date(&params.date)?;
    Ok(Json(state.catalog.schedules_by_movie_and_date(&id, date).await?))
}

// GET /api/movies/{id}/theaters?date=2025-03-14
async fn movie_theaters(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DateQuery>,
) -> Result<Json<Vec<TheaterShowtimes>>, AppError> {
    let date = parse_date(&params.date)?;
    Ok(Json(state.catalog.theaters_with_showtimes(&id, date).await?))
}

// GET /api/theaters
async fn list_theaters(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Theater>>, AppError> {
    Ok(Json(state.catalog.theaters().await?))
}
