use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::CommentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    InvalidArgument,
    NotFound,
    Transport,
}

/// Serializable failure summary handed to notification consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorReport {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Rejected comment body. Raised before any store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty")]
    Empty,
    #[error("too short")]
    TooShort,
    #[error("too long")]
    TooLong,
}

impl ValidationError {
    pub fn user_message(self) -> &'static str {
        match self {
            ValidationError::Empty => "Comment cannot be empty",
            ValidationError::TooShort => "Comment must be at least 10 characters long",
            ValidationError::TooLong => "Comment must be less than 1000 characters",
        }
    }
}

impl From<ValidationError> for ErrorReport {
    fn from(value: ValidationError) -> Self {
        ErrorReport::new(ErrorCode::Validation, value.user_message())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("comment with id {0} not found")]
    NotFound(CommentId),
    #[error("transport failure: {source}")]
    Transport { source: anyhow::Error },
}

impl StoreError {
    pub fn invalid_id(id: CommentId) -> Self {
        StoreError::InvalidArgument(format!("comment id must be a positive integer, got {id}"))
    }

    pub fn transport(source: impl Into<anyhow::Error>) -> Self {
        StoreError::Transport {
            source: source.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            StoreError::NotFound(_) => ErrorCode::NotFound,
            StoreError::Transport { .. } => ErrorCode::Transport,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<&StoreError> for ErrorReport {
    fn from(value: &StoreError) -> Self {
        let message = match value {
            StoreError::NotFound(_) => "comment no longer exists".to_string(),
            other => other.to_string(),
        };
        ErrorReport::new(value.code(), message)
    }
}
