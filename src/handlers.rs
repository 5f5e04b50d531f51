use crate::errors::{AppError, TrackerError};
use crate::habits::{DailyRecord, HabitInput, HabitPatch, parse_date};
use crate::models::{
    CalendarDay, HealthResponse, MonthQuery, MonthlyProgress, StreakInfo, Summary, WeeklyProgress,
};
use crate::program::WorkoutDay;
use crate::sessions::{ToggleExerciseRequest, WorkoutSession};
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Habit Tracker API is running! 💖".to_string(),
        today: state.tracker.today(),
    })
}

pub async fn get_today(State(state): State<AppState>) -> Json<DailyRecord> {
    let tracker = &state.tracker;
    Json(tracker.get_or_create(tracker.today()).await)
}

pub async fn get_summary(State(state): State<AppState>) -> Result<Json<Summary>, AppError> {
    let tracker = &state.tracker;
    Ok(Json(tracker.summary_at(tracker.today()).await?))
}

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<DailyRecord>> {
    Json(state.tracker.list_all().await)
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailyRecord>, AppError> {
    let date = parse_date(&date)?;
    Ok(Json(state.tracker.get_or_create(date).await))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(date): Path<String>,
    payload: Result<Json<HabitPatch>, JsonRejection>,
) -> Result<Json<DailyRecord>, AppError> {
    let date = parse_date(&date)?;
    let Json(patch) = payload?;
    Ok(Json(state.tracker.update(date, &patch).await?))
}

pub async fn replace_habit(
    State(state): State<AppState>,
    payload: Result<Json<HabitInput>, JsonRejection>,
) -> Result<Json<DailyRecord>, AppError> {
    let Json(input) = payload?;
    Ok(Json(state.tracker.replace(input).await?))
}

pub async fn get_weekly(State(state): State<AppState>) -> Json<WeeklyProgress> {
    Json(state.tracker.weekly_progress().await)
}

pub async fn get_monthly(
    State(state): State<AppState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<MonthlyProgress>, AppError> {
    let Query(query) = query?;
    Ok(Json(state.tracker.monthly_progress(query.year, query.month).await?))
}

pub async fn get_streak(State(state): State<AppState>) -> Json<StreakInfo> {
    Json(state.tracker.streak().await)
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path((year, month)): Path<(String, String)>,
) -> Result<Json<Vec<CalendarDay>>, AppError> {
    let year: i32 = parse_number("year", &year)?;
    let month: u32 = parse_number("month", &month)?;
    Ok(Json(state.tracker.calendar(year, month).await?))
}

pub async fn list_workouts(State(state): State<AppState>) -> Json<Vec<WorkoutDay>> {
    Json(state.tracker.program().days().cloned().collect())
}

pub async fn get_workout(
    State(state): State<AppState>,
    Path(day): Path<String>,
) -> Result<Json<WorkoutDay>, AppError> {
    let day = parse_number("day", &day)?;
    Ok(Json(state.tracker.workout(day)?.clone()))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<WorkoutSession>>, AppError> {
    let date = parse_date(&date)?;
    Ok(Json(state.tracker.sessions_for_date(date).await))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path((date, day)): Path<(String, String)>,
) -> Result<Json<WorkoutSession>, AppError> {
    let date = parse_date(&date)?;
    let day = parse_number("day", &day)?;
    Ok(Json(state.tracker.get_session(date, day).await?))
}

pub async fn toggle_exercise(
    State(state): State<AppState>,
    Path((date, day)): Path<(String, String)>,
    payload: Result<Json<ToggleExerciseRequest>, JsonRejection>,
) -> Result<Json<WorkoutSession>, AppError> {
    let date = parse_date(&date)?;
    let day = parse_number("day", &day)?;
    let Json(request) = payload?;
    let session = state
        .tracker
        .toggle_exercise(date, day, request.exercise_name.trim(), request.completed)
        .await?;
    Ok(Json(session))
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, TrackerError> {
    value
        .trim()
        .parse()
        .map_err(|_| TrackerError::validation(format!("{name} '{value}' is not a number")))
}
