use crate::calendar::LogCalendar;
use crate::errors::AppError;
use crate::models::{
    BodyPart, BodyPartInfo, CalendarDayResponse, DetailsRequest, EXERCISES, ExerciseRequest,
    LoginRequest, MonthResponse, NavigateRequest, OpenPatientRequest, Owner, PatientSummary,
    SelectPainRequest, SessionLog, SubmitPainRequest,
};
use crate::session::{self, PainUpdate, SessionState};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct SubmitPainResponse {
    pub outcome: Option<PainUpdate>,
    pub session: SessionState,
}

pub async fn list_exercises() -> Json<Vec<&'static str>> {
    Json(EXERCISES.to_vec())
}

pub async fn list_body_parts() -> Json<Vec<BodyPartInfo>> {
    Json(
        BodyPart::ALL
            .into_iter()
            .map(|id| BodyPartInfo { id, label: id.label() })
            .collect(),
    )
}

pub async fn list_patients(State(state): State<AppState>) -> Json<Vec<PatientSummary>> {
    let store = state.store.lock().await;
    let mut summaries = Vec::with_capacity(state.patients.len());
    for patient in state.patients.iter() {
        let logs = store.load(Some(&patient.id)).await;
        summaries.push(PatientSummary {
            id: patient.id.clone(),
            name: patient.name.clone(),
            last_session: LogCalendar::build(&logs).last_date(),
        });
    }
    Json(summaries)
}

pub async fn get_logs(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
) -> Json<Vec<SessionLog>> {
    let store = state.store.lock().await;
    Json(store.load(owner.id()).await)
}

pub async fn replace_logs(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
    Json(logs): Json<Vec<SessionLog>>,
) -> Result<Json<Vec<SessionLog>>, AppError> {
    let mut seen = HashSet::new();
    if let Some(log) = logs.iter().find(|log| !seen.insert(log.id.as_str())) {
        return Err(AppError::bad_request(format!("duplicate log id {:?}", log.id)));
    }
    let mut store = state.store.lock().await;
    store.save(&logs, owner.id()).await?;
    info!(count = logs.len(), "replaced log collection");
    Ok(Json(logs))
}

pub async fn append_log(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
    Json(log): Json<SessionLog>,
) -> Result<Json<Vec<SessionLog>>, AppError> {
    if log.id.trim().is_empty() {
        return Err(AppError::bad_request("log id must not be empty"));
    }
    let mut store = state.store.lock().await;
    let logs = store.append(log, owner.id()).await?;
    Ok(Json(logs))
}

pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(owner): Query<Owner>,
) -> Result<Json<Vec<SessionLog>>, AppError> {
    let mut store = state.store.lock().await;
    let logs = store.remove(&id, owner.id()).await?;
    Ok(Json(logs))
}

pub async fn calendar_day(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
    Query(owner): Query<Owner>,
) -> Json<CalendarDayResponse> {
    let calendar = load_calendar(&state, &owner).await;
    Json(CalendarDayResponse {
        date,
        logs: calendar.day(date).to_vec(),
    })
}

pub async fn calendar_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(owner): Query<Owner>,
) -> Result<Json<MonthResponse>, AppError> {
    let calendar = load_calendar(&state, &owner).await;
    let days = calendar
        .month(year, month)
        .ok_or_else(|| AppError::bad_request(format!("invalid month {year}-{month}")))?;
    Ok(Json(MonthResponse { year, month, days }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
) -> Json<SessionState> {
    let mut sessions = state.sessions.lock().await;
    Json(session_for(&mut sessions, &owner).clone())
}

pub async fn login(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
    Json(payload): Json<LoginRequest>,
) -> Json<SessionState> {
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    session.login(payload.role);
    info!(user = ?owner.id(), role = ?payload.role, "logged in");
    Json(session.clone())
}

pub async fn logout(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
) -> Json<SessionState> {
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    session.logout();
    Json(session.clone())
}

pub async fn start_exercise(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
    Json(payload): Json<ExerciseRequest>,
) -> Result<Json<SessionState>, AppError> {
    let exercise = payload.exercise.trim();
    if exercise.is_empty() {
        return Err(AppError::bad_request("exercise must not be empty"));
    }
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    session.start_exercise(exercise);
    Ok(Json(session.clone()))
}

pub async fn open_patient(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
    Json(payload): Json<OpenPatientRequest>,
) -> Result<Json<SessionState>, AppError> {
    if !state.patients.iter().any(|patient| patient.id == payload.patient_id) {
        return Err(AppError::not_found(format!(
            "unknown patient {:?}",
            payload.patient_id
        )));
    }
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    session.open_patient(payload.patient_id)?;
    Ok(Json(session.clone()))
}

pub async fn back_to_dashboard(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
) -> Json<SessionState> {
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    session.back_to_dashboard();
    Json(session.clone())
}

pub async fn navigate(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
    Json(payload): Json<NavigateRequest>,
) -> Json<SessionState> {
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    session.navigate(payload.view);
    Json(session.clone())
}

pub async fn select_pain(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
    Json(payload): Json<SelectPainRequest>,
) -> Json<SessionState> {
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    session.select_body_part(payload.part_id, payload.coords());
    Json(session.clone())
}

pub async fn submit_pain(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
    Json(payload): Json<SubmitPainRequest>,
) -> Result<Json<SubmitPainResponse>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    let outcome = session.submit_pain(payload.level)?;
    debug!(?outcome, level = payload.level, "pain submitted");
    Ok(Json(SubmitPainResponse {
        outcome,
        session: session.clone(),
    }))
}

pub async fn cancel_pain(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
) -> Json<SessionState> {
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    session.cancel_pain();
    Json(session.clone())
}

pub async fn remove_pain(
    State(state): State<AppState>,
    Path(part): Path<String>,
    Query(owner): Query<Owner>,
) -> Result<Json<SessionState>, AppError> {
    let part = BodyPart::from_id(&part)
        .ok_or_else(|| AppError::not_found(format!("unknown body part {part:?}")))?;
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    session.remove_pain_point(part);
    Ok(Json(session.clone()))
}

pub async fn update_details(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
    Json(payload): Json<DetailsRequest>,
) -> Result<Json<SessionState>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    if let Some(level) = payload.fatigue_level {
        session.set_fatigue_level(level)?;
    }
    if let Some(work_time) = payload.work_time {
        session.set_work_time(work_time);
    }
    if let Some(rest_time) = payload.rest_time {
        session.set_rest_time(rest_time);
    }
    if let Some(comments) = payload.comments {
        session.set_comments(comments);
    }
    Ok(Json(session.clone()))
}

pub async fn reset_session(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
) -> Json<SessionState> {
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    session.reset();
    Json(session.clone())
}

pub async fn save_session(
    State(state): State<AppState>,
    Query(owner): Query<Owner>,
) -> Result<Json<SessionLog>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = session_for(&mut sessions, &owner);
    let mut store = state.store.lock().await;
    let (log, _) = session::save_session(session, &mut *store, owner.id()).await?;
    Ok(Json(log))
}

fn session_for<'a>(
    sessions: &'a mut HashMap<Option<String>, SessionState>,
    owner: &Owner,
) -> &'a mut SessionState {
    sessions
        .entry(owner.id().map(str::to_string))
        .or_default()
}

/// Builds the calendar for whoever the caller's session is looking at.
async fn load_calendar(state: &AppState, owner: &Owner) -> LogCalendar {
    let sessions = state.sessions.lock().await;
    let target = match sessions.get(&owner.id().map(str::to_string)) {
        Some(session) => session.log_owner(owner.id()),
        None => owner.id(),
    };
    let store = state.store.lock().await;
    LogCalendar::build(&store.load(target).await)
}
