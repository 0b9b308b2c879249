//! Structured error types for lifecycle operation results.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (4xx-like)
    Unauthenticated,
    InvalidTitle,

    // Not found errors
    TaskNotFound,

    // Internal errors
    DatabaseError,
    InternalError,
}

/// Structured error carried back to the caller of a lifecycle operation.
///
/// Every failure an operation can hit (missing identity, row not found under
/// the caller's identity, store fault) is converted into one of these at the
/// operation boundary; nothing propagates past it as an unhandled fault.
#[derive(Debug, Serialize)]
pub struct OpError {
    pub code: ErrorCode,
    pub message: String,
}

impl OpError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    // Convenience constructors

    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "User not authenticated")
    }

    pub fn invalid_title() -> Self {
        Self::new(ErrorCode::InvalidTitle, "Title is required")
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {}", task_id),
        )
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for OpError {}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for OpError {
    fn from(err: anyhow::Error) -> Self {
        // Try to downcast to OpError first
        match err.downcast::<OpError>() {
            Ok(op_err) => op_err,
            Err(err) => OpError::database(err),
        }
    }
}

/// Result type for lifecycle operations.
pub type OpResult<T> = std::result::Result<T, OpError>;
