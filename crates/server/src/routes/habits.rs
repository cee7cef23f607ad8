//! Habit endpoints under `/api/habits`.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracker_core::{Habit, HabitId, HabitPatch, MonthDayMark, MonthKey, NewHabit};

use super::parse_id;
use crate::{auth::Caller, error::ApiError, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ToggleQuery {
    /// Calendar date the toggle applies to; the server's local date if absent
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthProgressBody {
    pub month_key: String,
    pub day_index: usize,
    pub value: bool,
    #[serde(default)]
    pub days_in_month: Option<usize>,
}

impl MonthProgressBody {
    fn into_mark(self) -> Result<MonthDayMark, ApiError> {
        let month: MonthKey = self
            .month_key
            .parse()
            .map_err(|e: tracker_core::CoreError| ApiError::BadRequest(e.to_string()))?;

        Ok(MonthDayMark {
            month,
            day_index: self.day_index,
            value: self.value,
            days_in_month: self.days_in_month.unwrap_or_else(|| month.calendar_days()),
        })
    }
}

fn habit_id(raw: &str) -> Result<HabitId, ApiError> {
    parse_id(raw, "Habit not found")
}

pub async fn list_habits(
    State(state): State<AppState>,
    Caller(user): Caller,
) -> Result<Json<Vec<Habit>>, ApiError> {
    Ok(Json(state.tracker.list_habits(user).await?))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Caller(user): Caller,
    payload: Result<Json<NewHabit>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let habit = state.tracker.create_habit(user, input).await?;
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn get_habit(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(id): Path<String>,
) -> Result<Json<Habit>, ApiError> {
    let id = habit_id(&id)?;
    Ok(Json(state.tracker.get_habit(id, user).await?))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(id): Path<String>,
    payload: Result<Json<HabitPatch>, JsonRejection>,
) -> Result<Json<Habit>, ApiError> {
    let id = habit_id(&id)?;
    let Json(patch) = payload?;
    Ok(Json(state.tracker.update_habit(id, user, patch).await?))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = habit_id(&id)?;
    state.tracker.delete_habit(id, user).await?;
    Ok(Json(json!({ "success": true, "id": id })))
}

pub async fn toggle_today(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(id): Path<String>,
    query: Result<Query<ToggleQuery>, QueryRejection>,
) -> Result<Json<Habit>, ApiError> {
    let id = habit_id(&id)?;
    let Query(query) = query?;
    let today = query
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    Ok(Json(state.tracker.toggle_today(id, user, today).await?))
}

pub async fn set_month_day(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(id): Path<String>,
    payload: Result<Json<MonthProgressBody>, JsonRejection>,
) -> Result<Json<Habit>, ApiError> {
    let id = habit_id(&id)?;
    let Json(body) = payload?;
    let mark = body.into_mark()?;

    Ok(Json(state.tracker.set_month_day(id, user, mark).await?))
}
