//! Crate-wide error type

use thiserror::Error;

/// Errors raised by the store, the taxonomy and input validation.
///
/// Text-generation failures live in [`crate::llm::LlmError`] and never
/// surface through this type: the coach turns them into fallback advice.
#[derive(Debug, Error)]
pub enum LiftError {
    /// Store unreachable or a row could not be decoded
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// User input outside the accepted range
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("exercise '{exercise}' already exists under '{body_part}'")]
    DuplicateExercise { exercise: String, body_part: String },

    #[error("exercise '{exercise}' not found under '{body_part}'")]
    ExerciseNotFound { body_part: String, exercise: String },

    /// Taxonomy document could not be written
    #[error("taxonomy not saved: {0}")]
    Taxonomy(String),
}

impl From<rusqlite::Error> for LiftError {
    fn from(e: rusqlite::Error) -> Self {
        LiftError::DataUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for LiftError {
    fn from(e: serde_json::Error) -> Self {
        LiftError::DataUnavailable(e.to_string())
    }
}

impl From<std::io::Error> for LiftError {
    fn from(e: std::io::Error) -> Self {
        LiftError::DataUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LiftError>;
