use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch},
};

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(handlers::health))
        .route("/today", get(handlers::get_today))
        .route("/summary", get(handlers::get_summary))
        .route("/habits", get(handlers::list_habits).post(handlers::replace_habit))
        .route("/habits/:date", get(handlers::get_habit).patch(handlers::update_habit))
        .route("/progress/weekly", get(handlers::get_weekly))
        .route("/progress/monthly", get(handlers::get_monthly))
        .route("/progress/streak", get(handlers::get_streak))
        .route("/calendar/:year/:month", get(handlers::get_calendar))
        .route("/workout", get(handlers::list_workouts))
        .route("/workout/:day", get(handlers::get_workout))
        .route("/workout-sessions/:date", get(handlers::list_sessions))
        .route("/workout-session/:date/:day", get(handlers::get_session))
        .route("/workout-session/:date/:day/exercise", patch(handlers::toggle_exercise));

    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .nest("/api", api)
        .layer(body_limit)
        .with_state(state)
}
