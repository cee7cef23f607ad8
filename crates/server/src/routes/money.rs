//! Money endpoints under `/api/money`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracker_core::{NewBudget, NewGoal, NewTransaction, TransactionId};
use tracker_money::Overview;

use super::parse_id;
use crate::{auth::Caller, error::ApiError, state::AppState};

pub async fn overview(
    State(state): State<AppState>,
    Caller(user): Caller,
) -> Result<Json<Overview>, ApiError> {
    Ok(Json(state.ledger.overview(user).await?))
}

pub async fn add_transaction(
    State(state): State<AppState>,
    Caller(user): Caller,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let transaction = state.ledger.add_transaction(user, input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: TransactionId = parse_id(&id, "Transaction not found")?;
    state.ledger.delete_transaction(user, id).await?;
    Ok(Json(json!({ "message": "Deleted" })))
}

pub async fn create_budget(
    State(state): State<AppState>,
    Caller(user): Caller,
    payload: Result<Json<NewBudget>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let budget = state.ledger.create_budget(user, input).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Caller(user): Caller,
    payload: Result<Json<NewGoal>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let goal = state.ledger.create_goal(user, input).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}
