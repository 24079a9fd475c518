//! Error type shared by the parsing, validation and settings entry points.
//!
//! The derivation pipeline itself never fails: malformed dates are read as
//! "no date" there. Only functions that take raw input by contract return
//! [`TaskResult`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    /// A date string that is neither `YYYY-MM-DD` nor an RFC 3339 timestamp.
    #[error("invalid date: {value:?}")]
    InvalidDate { value: String },

    /// Form input rejected by [`crate::task::NewTask::validate`].
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid settings: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskError {
    pub(crate) fn invalid_date(value: &str) -> Self {
        TaskError::InvalidDate {
            value: value.to_string(),
        }
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
