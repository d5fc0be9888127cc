use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::cache::CacheService;
use crate::models::{Movie, Review};
use crate::services::auth::{validation_message, AuthUser};
use crate::store::{self, Collection, DocumentStore, Filter, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("{0}")]
    Validation(String),

    #[error("movie {0} not found")]
    MovieNotFound(String),

    #[error("review {0} not found")]
    ReviewNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewReview {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 1000, message = "comment must be at most 1000 characters"))]
    pub comment: String,
}

/// Сводка по отзывам фильма. `distribution[i]` - число оценок i + 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub count: usize,
    pub average: f64,
    pub distribution: [usize; 5],
}

impl ReviewSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut distribution = [0usize; 5];
        let mut sum = 0u64;
        for review in reviews {
            let rating = review.rating.clamp(1, 5);
            distribution[usize::from(rating - 1)] += 1;
            sum += u64::from(rating);
        }

        let count = reviews.len();
        let average = if count == 0 {
            0.0
        } else {
            (sum as f64 / count as f64 * 10.0).round() / 10.0
        };
        Self { count, average, distribution }
    }
}

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn DocumentStore>,
    cache: Option<CacheService>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn DocumentStore>, cache: Option<CacheService>) -> Self {
        Self { store, cache }
    }

    /// Отзывы фильма, новые первыми.
    pub async fn reviews(&self, movie_id: &str) -> Result<Vec<Review>, ReviewError> {
        let mut reviews: Vec<Review> = store::fetch_all(
            self.store.as_ref(),
            Collection::Reviews,
            &[Filter::eq("movieId", movie_id)],
        )
        .await?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    pub async fn summary(&self, movie_id: &str) -> Result<ReviewSummary, ReviewError> {
        if let Some(cache) = &self.cache {
            if let Some(summary) = cache.get_review_summary(movie_id).await {
                return Ok(summary);
            }
        }

        let summary = ReviewSummary::from_reviews(&self.reviews(movie_id).await?);
        if let Some(cache) = &self.cache {
            cache.save_review_summary(movie_id, &summary).await;
        }
        Ok(summary)
    }

    pub async fn add_review(
        &self,
        user: &AuthUser,
        movie_id: &str,
        review: NewReview,
    ) -> Result<Review, ReviewError> {
        review
            .validate()
            .map_err(|e| ReviewError::Validation(validation_message(&e)))?;

        let movie: Option<Movie> = store::fetch(self.store.as_ref(), Collection::Movies, movie_id).await?;
        if movie.is_none() {
            return Err(ReviewError::MovieNotFound(movie_id.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let data = json!({
            "movieId": movie_id,
            "userId": user.uid,
            "rating": review.rating,
            "comment": review.comment.trim(),
            "helpfulCount": 0,
        });
        let doc = self
            .store
            .create(Collection::Reviews, &id, data, Some("createdAt"))
            .await?;
        let saved: Review = store::decode(Collection::Reviews, doc)?;

        if let Some(cache) = &self.cache {
            cache.invalidate_review_summary(movie_id).await;
        }
        info!("Review {} added to movie {} by {}", saved.id, movie_id, user.uid);
        Ok(saved)
    }

    /// Атомарный +1 к счётчику "полезно".
    pub async fn mark_helpful(&self, review_id: &str) -> Result<i64, ReviewError> {
        match self
            .store
            .increment(Collection::Reviews, review_id, "helpfulCount", 1)
            .await
        {
            Ok(count) => Ok(count),
            Err(StoreError::NotFound { .. }) => Err(ReviewError::ReviewNotFound(review_id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
