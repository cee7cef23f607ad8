//! Route handlers.

use std::str::FromStr;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{error::ApiError, state::AppState};

pub mod habits;
pub mod money;

pub async fn root_handler() -> impl IntoResponse {
    Json(json!({ "message": "Ultimate Tracker API running" }))
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.storage.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}

/// Ids that do not parse cannot name an existing record.
fn parse_id<T: FromStr>(raw: &str, not_found: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(not_found.to_string()))
}
