use crate::cache::CacheService;
use crate::models::{Movie, MovieStatus, Theater};
use crate::services::reviews::ReviewSummary;

fn movies_key(status: MovieStatus) -> String {
    format!("movies:{}", status.as_str())
}

fn summary_key(movie_id: &str) -> String {
    format!("reviews:{}:summary", movie_id)
}

impl CacheService {
    // === Фильмы ===
    pub async fn get_movies(&self, status: MovieStatus) -> Option<Vec<Movie>> {
        self.get_json(&movies_key(status)).await
    }

    pub async fn save_movies(&self, status: MovieStatus, movies: &[Movie]) {
        self.set_json(&movies_key(status), movies, self.ttl.catalog_ttl_seconds)
            .await
    }

    // === Кинотеатры ===
    pub async fn get_theaters(&self) -> Option<Vec<Theater>> {
        self.get_json("theaters").await
    }

    pub async fn save_theaters(&self, theaters: &[Theater]) {
        self.set_json("theaters", theaters, self.ttl.catalog_ttl_seconds)
            .await
    }

    // === Отзывы ===
    pub async fn get_review_summary(&self, movie_id: &str) -> Option<ReviewSummary> {
        self.get_json(&summary_key(movie_id)).await
    }

    pub async fn save_review_summary(&self, movie_id: &str, summary: &ReviewSummary) {
        self.set_json(&summary_key(movie_id), summary, self.ttl.reviews_ttl_seconds)
            .await
    }

    pub async fn invalidate_review_summary(&self, movie_id: &str) {
        self.invalidate(&summary_key(movie_id)).await
    }
}
