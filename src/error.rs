//! Error type shared by the grading library.

use thiserror::Error;

/// Errors raised while loading, validating or grading a class.
#[derive(Error, Debug)]
pub enum GradeError {
    #[error("CSV must contain columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },

    #[error("column '{0}' appears more than once in the header")]
    DuplicateColumn(String),

    #[error("student '{student_id}' appears more than once in subject '{subject_code}'")]
    DuplicateEntry {
        student_id: String,
        subject_code: String,
    },

    #[error("input contains no student rows")]
    EmptyInput,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GradeError>;
