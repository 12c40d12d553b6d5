use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/exercises", get(handlers::list_exercises))
        .route("/api/body-parts", get(handlers::list_body_parts))
        .route(
            "/api/logs",
            get(handlers::get_logs)
                .put(handlers::replace_logs)
                .post(handlers::append_log),
        )
        .route("/api/logs/:id", delete(handlers::delete_log))
        .route("/api/calendar/day/:date", get(handlers::calendar_day))
        .route("/api/calendar/month/:year/:month", get(handlers::calendar_month))
        .route("/api/patients", get(handlers::list_patients))
        .route("/api/session", get(handlers::get_session))
        .route("/api/session/login", post(handlers::login))
        .route("/api/session/logout", post(handlers::logout))
        .route("/api/session/patient", post(handlers::open_patient))
        .route("/api/session/dashboard", post(handlers::back_to_dashboard))
        .route("/api/session/exercise", post(handlers::start_exercise))
        .route("/api/session/navigate", post(handlers::navigate))
        .route("/api/session/pain/select", post(handlers::select_pain))
        .route("/api/session/pain/submit", post(handlers::submit_pain))
        .route("/api/session/pain/cancel", post(handlers::cancel_pain))
        .route("/api/session/pain-points/:part", delete(handlers::remove_pain))
        .route("/api/session/details", put(handlers::update_details))
        .route("/api/session/reset", post(handlers::reset_session))
        .route("/api/session/save", post(handlers::save_session))
        .with_state(state)
}
