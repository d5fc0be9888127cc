use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::Review;
use crate::services::reviews::{NewReview, ReviewSummary};
use crate::services::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies/{id}/reviews", get(list_reviews).post(add_review))
        .route("/reviews/{id}/helpful", post(mark_helpful))
}

#[derive(Debug, Serialize)]
struct ReviewsResponse {
    summary: ReviewSummary,
    reviews: Vec<Review>,
}

// GET /api/movies/{id}/reviews
async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> Result<Json<ReviewsResponse>, AppError> {
    let reviews = state.reviews.reviews(&movie_id).await?;
    let summary = state.reviews.summary(&movie_id).await?;
    Ok(Json(ReviewsResponse { summary, reviews }))
}

// POST /api/movies/{id}/reviews
async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
    user: AuthUser,
    Json(req): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let review = state.reviews.add_review(&user, &movie_id, req).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

// POST /api/reviews/{id}/helpful
async fn mark_helpful(
    State(state): State<Arc<AppState>>,
    Path(review_id): Path<String>,
    _user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let count = state.reviews.mark_helpful(&review_id).await?;
    Ok(Json(json!({ "id": review_id, "helpfulCount": count })))
}
