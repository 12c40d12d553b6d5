//! In-progress session state and the view flow that drives it.
//!
//! One `SessionState` exists per identity for the lifetime of a login. It
//! never holds the saved collection, only the log being built.

use crate::errors::{SaveError, SessionError};
use crate::models::{
    BodyPart, Coords, DEFAULT_FATIGUE_LEVEL, MAX_LEVEL, PainPoint, Role, SessionLog, View,
};
use crate::storage::{KeyValueStore, LogStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What a pain submission did to the pending pain points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PainUpdate {
    Added,
    Updated,
    Removed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    current_exercise: Option<String>,
    pain_points: Vec<PainPoint>,
    fatigue_level: u8,
    work_time: String,
    rest_time: String,
    comments: String,
    current_view: View,
    role: Option<Role>,
    selected_patient: Option<String>,
    selected_body_part: Option<BodyPart>,
    click_coords: Option<Coords>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_exercise: None,
            pain_points: Vec::new(),
            fatigue_level: DEFAULT_FATIGUE_LEVEL,
            work_time: String::new(),
            rest_time: String::new(),
            comments: String::new(),
            current_view: View::ExerciseSelection,
            role: None,
            selected_patient: None,
            selected_body_part: None,
            click_coords: None,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts at the login view with no role.
    pub fn logged_out() -> Self {
        Self {
            current_view: View::Login,
            ..Self::default()
        }
    }

    pub fn current_exercise(&self) -> Option<&str> {
        self.current_exercise.as_deref()
    }

    pub fn pain_points(&self) -> &[PainPoint] {
        &self.pain_points
    }

    pub fn fatigue_level(&self) -> u8 {
        self.fatigue_level
    }

    pub fn work_time(&self) -> &str {
        &self.work_time
    }

    pub fn rest_time(&self) -> &str {
        &self.rest_time
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn current_view(&self) -> View {
        self.current_view
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn selected_patient(&self) -> Option<&str> {
        self.selected_patient.as_deref()
    }

    pub fn selected_body_part(&self) -> Option<BodyPart> {
        self.selected_body_part
    }

    pub fn click_coords(&self) -> Option<Coords> {
        self.click_coords
    }

    pub fn navigate(&mut self, view: View) {
        self.current_view = view;
    }

    pub fn login(&mut self, role: Role) {
        self.role = Some(role);
        self.current_view = role.home_view();
    }

    pub fn logout(&mut self) {
        *self = Self::logged_out();
    }

    /// Physio dashboard: open one patient's history.
    pub fn open_patient(&mut self, patient_id: impl Into<String>) -> Result<(), SessionError> {
        if self.role != Some(Role::Physio) {
            return Err(SessionError::NotPhysio);
        }
        self.selected_patient = Some(patient_id.into());
        self.current_view = View::PatientDetail;
        Ok(())
    }

    pub fn back_to_dashboard(&mut self) {
        self.selected_patient = None;
        self.current_view = View::PhysioDashboard;
    }

    /// Identity whose logs this session is looking at: the opened patient
    /// while on the patient detail view, otherwise `own`.
    pub fn log_owner<'a>(&'a self, own: Option<&'a str>) -> Option<&'a str> {
        match (self.current_view, self.selected_patient.as_deref()) {
            (View::PatientDetail, Some(patient)) => Some(patient),
            _ => own,
        }
    }

    pub fn start_exercise(&mut self, exercise: impl Into<String>) {
        self.current_exercise = Some(exercise.into());
        self.current_view = View::SessionLogging;
    }

    pub fn set_fatigue_level(&mut self, level: u8) -> Result<(), SessionError> {
        check_level(level)?;
        self.fatigue_level = level;
        Ok(())
    }

    pub fn set_work_time(&mut self, value: impl Into<String>) {
        self.work_time = value.into();
    }

    pub fn set_rest_time(&mut self, value: impl Into<String>) {
        self.rest_time = value.into();
    }

    pub fn set_comments(&mut self, value: impl Into<String>) {
        self.comments = value.into();
    }

    /// Clears the pending log. The chosen exercise and current view survive.
    pub fn reset(&mut self) {
        self.pain_points.clear();
        self.fatigue_level = DEFAULT_FATIGUE_LEVEL;
        self.work_time.clear();
        self.rest_time.clear();
        self.comments.clear();
        self.clear_selection();
    }

    /// Inserts, updates or removes the pain point for `part`.
    ///
    /// A level of 0 removes the entry. An existing entry keeps its old
    /// coordinates when none are given; a new entry must have them.
    pub fn upsert_pain_point(
        &mut self,
        part: BodyPart,
        level: u8,
        coords: Option<Coords>,
    ) -> Result<PainUpdate, SessionError> {
        check_level(level)?;
        let existing = self.pain_points.iter().position(|point| point.part_id == part);

        match (level, existing) {
            (0, Some(index)) => {
                self.pain_points.remove(index);
                Ok(PainUpdate::Removed)
            }
            (0, None) => Ok(PainUpdate::Unchanged),
            (_, Some(index)) => {
                let point = &mut self.pain_points[index];
                point.level = level;
                if let Some(coords) = coords {
                    point.coords = coords;
                }
                Ok(PainUpdate::Updated)
            }
            (_, None) => {
                let coords = coords.ok_or(SessionError::MissingCoordinates(part))?;
                self.pain_points.push(PainPoint {
                    part_id: part,
                    level,
                    coords,
                });
                Ok(PainUpdate::Added)
            }
        }
    }

    pub fn remove_pain_point(&mut self, part: BodyPart) -> bool {
        let before = self.pain_points.len();
        self.pain_points.retain(|point| point.part_id != part);
        self.pain_points.len() != before
    }

    /// Body-part click on the diagram: remember what is awaiting a level.
    pub fn select_body_part(&mut self, part: BodyPart, coords: Option<Coords>) {
        self.selected_body_part = Some(part);
        self.click_coords = coords;
        self.current_view = View::PainLogging;
    }

    /// Applies `level` to the selected part and returns to session logging.
    ///
    /// Without a selection this does nothing and returns `None`. On a
    /// validation error the selection is kept so the level can be retried.
    pub fn submit_pain(&mut self, level: u8) -> Result<Option<PainUpdate>, SessionError> {
        let Some(part) = self.selected_body_part else {
            return Ok(None);
        };
        let update = self.upsert_pain_point(part, level, self.click_coords)?;
        self.clear_selection();
        self.current_view = View::SessionLogging;
        Ok(Some(update))
    }

    pub fn cancel_pain(&mut self) {
        self.clear_selection();
        self.current_view = View::SessionLogging;
    }

    /// Snapshots the pending fields into a new log.
    pub fn build_log(&self, id: String, timestamp: DateTime<Utc>) -> Result<SessionLog, SessionError> {
        let exercise = self
            .current_exercise
            .clone()
            .filter(|name| !name.trim().is_empty())
            .ok_or(SessionError::NoExercise)?;

        Ok(SessionLog {
            id,
            exercise,
            pain_points: self.pain_points.clone(),
            fatigue_level: self.fatigue_level,
            work_time: parse_duration("workTime", &self.work_time)?,
            rest_time: parse_duration("restTime", &self.rest_time)?,
            comments: self.comments.clone(),
            timestamp,
        })
    }

    fn clear_selection(&mut self) {
        self.selected_body_part = None;
        self.click_coords = None;
    }
}

/// Builds a log from `session`, appends it, then resets the session back to
/// exercise selection. Returns the new log and the updated collection.
pub async fn save_session<S: KeyValueStore>(
    session: &mut SessionState,
    store: &mut LogStore<S>,
    owner: Option<&str>,
) -> Result<(SessionLog, Vec<SessionLog>), SaveError> {
    let log = session.build_log(Uuid::new_v4().to_string(), Utc::now())?;
    let logs = store.append(log.clone(), owner).await?;
    session.reset();
    session.navigate(View::ExerciseSelection);
    Ok((log, logs))
}

fn check_level(level: u8) -> Result<(), SessionError> {
    if level > MAX_LEVEL {
        return Err(SessionError::LevelOutOfRange(level));
    }
    Ok(())
}

fn parse_duration(field: &'static str, raw: &str) -> Result<f64, SessionError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(SessionError::InvalidDuration {
            field,
            value: raw.to_string(),
        }),
    }
}
