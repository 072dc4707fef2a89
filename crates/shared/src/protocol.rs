use serde::{Deserialize, Serialize};

use crate::{
    domain::{CommentId, ParentId, ParentType},
    error::{ErrorCode, ErrorReport},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommentOperation {
    Load,
    Add,
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

/// One user-facing report per finished operation. Delivery (toast, log line,
/// stderr) is up to whoever subscribes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub operation: CommentOperation,
    pub outcome: Outcome,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<CommentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl Notification {
    pub fn success(operation: CommentOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            outcome: Outcome::Success,
            message: message.into(),
            comment_id: None,
            code: None,
        }
    }

    pub fn failure(
        operation: CommentOperation,
        message: impl Into<String>,
        code: ErrorCode,
    ) -> Self {
        Self {
            operation,
            outcome: Outcome::Failure,
            message: message.into(),
            comment_id: None,
            code: Some(code),
        }
    }

    pub fn from_report(operation: CommentOperation, report: ErrorReport) -> Self {
        Self::failure(operation, report.message, report.code)
    }

    pub fn with_comment(mut self, comment_id: CommentId) -> Self {
        self.comment_id = Some(comment_id);
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Thread summary printed by the command-line shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadCount {
    pub parent_id: ParentId,
    pub parent_type: ParentType,
    pub count: usize,
}
