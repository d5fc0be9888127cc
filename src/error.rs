use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::services::{AuthError, BookingError, CatalogError, ReviewError};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(e) => match e {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::EmailInUse => StatusCode::CONFLICT,
                AuthError::InvalidCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Booking(e) => match e {
                BookingError::MissingBookingInfo => StatusCode::UNPROCESSABLE_ENTITY,
                BookingError::MustSignIn => StatusCode::UNAUTHORIZED,
                BookingError::NoSeatsSelected | BookingError::UnknownSeats { .. } => StatusCode::BAD_REQUEST,
                BookingError::Conflict { .. } | BookingError::AlreadySaved | BookingError::InProgress => {
                    StatusCode::CONFLICT
                }
                BookingError::Store(e) => store_status(e),
            },
            AppError::Catalog(e) => match e {
                CatalogError::MalformedTimestamp { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                CatalogError::Store(e) => store_status(e),
            },
            AppError::Review(e) => match e {
                ReviewError::Validation(_) => StatusCode::BAD_REQUEST,
                ReviewError::MovieNotFound(_) | ReviewError::ReviewNotFound(_) => StatusCode::NOT_FOUND,
                ReviewError::Store(e) => store_status(e),
            },
            AppError::Store(e) => store_status(e),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
        StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Decode { .. } | StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body: Value = match &self {
            AppError::Booking(BookingError::Conflict { seats }) => json!({
                "error": self.to_string(),
                "seats": seats,
            }),
            AppError::Booking(BookingError::UnknownSeats { seats }) => json!({
                "error": self.to_string(),
                "seats": seats,
            }),
            // Ошибки бэкенда аутентификации отдаются как есть
            AppError::Auth(AuthError::Backend(msg)) => {
                tracing::error!("Auth backend error: {}", msg);
                json!({ "error": msg })
            }
            _ if status.is_server_error() => {
                tracing::error!("Internal Server Error: {}", self);
                json!({ "error": "Internal Server Error" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
