use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose};
use std::sync::Arc;

use crate::error::AppError;
use crate::services::AuthUser;
use crate::AppState;

// Bearer <jwt> или Basic email:password
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = authorization(parts)
            .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;
        authenticate(&auth_header, state).await
    }
}

// Нет заголовка - None; неверный заголовок - всё равно 401
impl OptionalFromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Option<Self>, Self::Rejection> {
        match authorization(parts) {
            Some(auth_header) => authenticate(&auth_header, state).await.map(Some),
            None => Ok(None),
        }
    }
}

fn authorization(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn authenticate(auth_header: &str, state: &AppState) -> Result<AuthUser, AppError> {
    if let Some(token) = auth_header.strip_prefix("Bearer ") {
        return Ok(state.auth.verify_token(token.trim())?);
    }

    let encoded = auth_header
        .strip_prefix("Basic ")
        .ok_or_else(|| AppError::Unauthorized("unsupported authorization scheme".to_string()))?;
    let (email, password) = decode_basic(encoded)
        .ok_or_else(|| AppError::Unauthorized("malformed basic credentials".to_string()))?;

    Ok(state.auth.verify_credentials(&email, &password).await?)
}

fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;

    // Разделяем email:password
    let (email, password) = credentials.split_once(':')?;
    Some((email.to_string(), password.to_string()))
}
