use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::UserProfile;
use crate::services::auth::{AuthSession, SignInRequest, SignUpRequest};
use crate::services::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/me", get(me))
}

// POST /api/auth/sign-up
async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthSession>), AppError> {
    let session = state.auth.sign_up(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

// POST /api/auth/sign-in
async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<AuthSession>, AppError> {
    Ok(Json(state.auth.sign_in(req).await?))
}

// GET /api/auth/me
async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    state
        .auth
        .profile(&user.uid)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("profile {} not found", user.uid)))
}
