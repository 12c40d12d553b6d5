use crate::models::{BodyPart, MAX_LEVEL};
use axum::http::StatusCode;
use thiserror::Error;

/// Rejected mutations of the in-progress session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("level {0} is outside 0-{max}", max = MAX_LEVEL)]
    LevelOutOfRange(u8),
    #[error("no coordinates recorded for new pain point on {0}")]
    MissingCoordinates(BodyPart),
    #[error("no exercise selected")]
    NoExercise,
    #[error("only a physio can open a patient's history")]
    NotPhysio,
    #[error("{field} must be a non-negative number, got {value:?}")]
    InvalidDuration { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to encode logs: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write storage: {0}")]
    Io(#[from] std::io::Error),
    #[error("a log with id {0:?} already exists")]
    DuplicateId(String),
}

/// Saving touches both the session and the store; either can fail.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateId(_) => Self::conflict(err.to_string()),
            err => Self::internal(err),
        }
    }
}

impl From<SaveError> for AppError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Session(err) => err.into(),
            SaveError::Store(err) => err.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
