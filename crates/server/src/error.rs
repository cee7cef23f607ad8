//! API error responses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use tracker_money::MoneyError;
use tracker_progress::TrackerError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not authorized")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retryable = matches!(self, ApiError::Unavailable(_));
        if retryable {
            error!("{self}");
        }

        (
            status,
            Json(json!({ "message": self.to_string(), "retryable": retryable })),
        )
            .into_response()
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::NotFound(_) => ApiError::NotFound("Habit not found".to_string()),
            TrackerError::InvalidArgument(e) => ApiError::BadRequest(e.to_string()),
            TrackerError::Storage(e) => ApiError::Unavailable(e.to_string()),
        }
    }
}

impl From<MoneyError> for ApiError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::NotFound(_) => ApiError::NotFound("Transaction not found".to_string()),
            MoneyError::InvalidArgument(e) => ApiError::BadRequest(e.to_string()),
            MoneyError::Storage(e) => ApiError::Unavailable(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
