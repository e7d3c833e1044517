use axum::http::StatusCode;
use chrono::NaiveDate;
use thiserror::Error;

/// Failures talking to the remote record store. Never fatal.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
    #[error("remote write failed: {0}")]
    WriteFailed(String),
}

/// Why a cache read produced nothing. Callers of `LocalCache::load` never see this.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Mutations the engine refuses to apply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("day {day} is outside the {total}-day window")]
    DayOutOfRange { day: usize, total: usize },
    #[error("unknown task '{0}'")]
    UnknownTask(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a date formatted YYYY-MM-DD, got '{value}'")]
    InvalidDate { name: &'static str, value: String },
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be 'canonical' or 'legacy', got '{value}'")]
    InvalidSchema { name: &'static str, value: String },
    #[error("a {total_days}-day window starting {start} is out of range (at most {max} days)")]
    WindowOutOfRange {
        start: NaiveDate,
        total_days: usize,
        max: usize,
    },
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
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::DayOutOfRange { .. } => Self::not_found(err.to_string()),
            TrackerError::UnknownTask(_) => Self::bad_request(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
